//! Schematic animal and plant cells.

use crate::geom::{Point, point};
use crate::svg::{Node, SvgDocument, fmt};
use crate::{RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::cell::{CellData, CellKind, Organelle};
use std::collections::BTreeSet;

const CYTOPLASM_FILL: &str = "#ecfdf5";
const EMPTY_FILL: &str = "#ffffff";

struct Paint<'a> {
    fill: &'a str,
    stroke: &'a str,
    width: f64,
}

/// Picks the highlight paint for highlighted organelles, the organelle's own colors otherwise.
struct Painter<'a> {
    highlighted: BTreeSet<Organelle>,
    fill: &'a str,
    stroke: &'a str,
}

impl<'a> Painter<'a> {
    fn paint(&self, o: Organelle, fill: &'a str, stroke: &'a str) -> Paint<'a> {
        if self.highlighted.contains(&o) {
            Paint {
                fill: self.fill,
                stroke: self.stroke,
                width: 2.5,
            }
        } else {
            Paint {
                fill,
                stroke,
                width: 1.5,
            }
        }
    }
}

/// The organelles to draw: parsed, restricted to the cell kind, defaulting to membrane and
/// nucleus.
pub fn selected_organelles(data: &CellData) -> BTreeSet<Organelle> {
    let mut out = BTreeSet::new();
    for raw in &data.structures {
        match Organelle::parse(raw) {
            Some(o) if o.plant_only() && data.cell_type != CellKind::Plant => {
                tracing::debug!(structure = %raw, "cell: plant-only structure on an animal cell");
            }
            Some(o) => {
                out.insert(o);
            }
            None => tracing::debug!(structure = %raw, "cell: unknown structure skipped"),
        }
    }
    if out.is_empty() {
        out.insert(Organelle::Membrane);
        out.insert(Organelle::Nucleus);
    }
    out
}

pub fn render_cell(data: &CellData, ctx: &RenderContext) -> Result<SvgDocument> {
    let canvas = ctx.canvas(DomainTag::Cell);
    let stroke = ctx.settings.stroke.as_str();
    let mut doc = ctx.document(DomainTag::Cell, canvas.width, canvas.height);
    let c = point(canvas.width / 2.0, canvas.height / 2.0);
    let plant = data.cell_type == CellKind::Plant;

    let selected = selected_organelles(data);
    let painter = Painter {
        highlighted: data
            .highlight
            .iter()
            .filter_map(|h| Organelle::parse(h))
            .collect(),
        fill: ctx.settings.highlight_fill.as_str(),
        stroke: ctx.settings.highlight_stroke.as_str(),
    };

    let mut body = Node::group().class(if plant { "cell cell-plant" } else { "cell cell-animal" });
    let mut labels: Vec<(Organelle, Point)> = Vec::new();
    let interior = if selected.contains(&Organelle::Cytoplasm) {
        CYTOPLASM_FILL
    } else {
        EMPTY_FILL
    };

    // Boundary first; plants always get their wall.
    if plant {
        let p = painter.paint(Organelle::CellWall, "#d9f99d", "#4d7c0f");
        body.push(
            styled(Node::rounded_rect(c.x - 150.0, c.y - 110.0, 300.0, 220.0, 14.0), &p)
                .class("organelle organelle-cell-wall")
                .num("stroke-width", p.width + 2.0),
        );
        let p = painter.paint(Organelle::Membrane, interior, stroke);
        body.push(
            styled(Node::rounded_rect(c.x - 142.0, c.y - 102.0, 284.0, 204.0, 10.0), &p)
                .class("organelle organelle-membrane"),
        );
        if selected.contains(&Organelle::CellWall) {
            labels.push((Organelle::CellWall, point(c.x - 110.0, c.y - 114.0)));
        }
        if selected.contains(&Organelle::Membrane) {
            labels.push((Organelle::Membrane, point(c.x + 90.0, c.y + 96.0)));
        }
    } else {
        let p = painter.paint(Organelle::Membrane, interior, stroke);
        body.push(
            styled(Node::ellipse(c.x, c.y, 150.0, 110.0), &p).class("organelle organelle-membrane"),
        );
        if selected.contains(&Organelle::Membrane) {
            labels.push((Organelle::Membrane, point(c.x + 96.0, c.y + 96.0)));
        }
    }
    if selected.contains(&Organelle::Cytoplasm) {
        labels.push((Organelle::Cytoplasm, point(c.x - 70.0, c.y + 70.0)));
    }

    for &o in &selected {
        let Some((node, label_at)) = organelle(o, c, plant, &painter) else {
            continue;
        };
        body.push(node.class(format!("organelle organelle-{}", slug(o))));
        labels.push((o, label_at));
    }
    doc.push(body);

    if data.show_labels {
        let mut group = Node::group().class("labels");
        for (o, at) in labels {
            group.push(
                Node::text(at.x, at.y, o.display_name())
                    .anchor("middle")
                    .font_size(ctx.settings.font_size - 2.0)
                    .fill(stroke)
                    .stroke("#ffffff")
                    .stroke_width(3.0)
                    .attr("paint-order", "stroke"),
            );
        }
        doc.push(group);
    }
    Ok(doc)
}

fn styled(node: Node, p: &Paint<'_>) -> Node {
    node.fill(p.fill).stroke(p.stroke).stroke_width(p.width)
}

fn slug(o: Organelle) -> &'static str {
    match o {
        Organelle::CellWall => "cell-wall",
        Organelle::Membrane => "membrane",
        Organelle::Cytoplasm => "cytoplasm",
        Organelle::Vacuole => "vacuole",
        Organelle::Nucleus => "nucleus",
        Organelle::EndoplasmicReticulum => "er",
        Organelle::Golgi => "golgi",
        Organelle::Mitochondria => "mitochondria",
        Organelle::Chloroplast => "chloroplast",
        Organelle::Lysosome => "lysosome",
        Organelle::Ribosome => "ribosome",
    }
}

/// Glyph and label anchor of one interior organelle. The boundary organelles are drawn by the
/// caller and yield `None` here.
fn organelle(o: Organelle, c: Point, plant: bool, painter: &Painter<'_>) -> Option<(Node, Point)> {
    let at = |dx: f64, dy: f64| point(c.x + dx, c.y + dy);
    let out = match o {
        Organelle::CellWall | Organelle::Membrane | Organelle::Cytoplasm => return None,
        Organelle::Vacuole => {
            let p = painter.paint(o, "#e0f2fe", "#0284c7");
            let v = at(-30.0, 10.0);
            (styled(Node::ellipse(v.x, v.y, 70.0, 50.0), &p), v)
        }
        Organelle::Nucleus => {
            let (n, r) = if plant {
                (at(75.0, -45.0), 26.0)
            } else {
                (at(-20.0, 0.0), 32.0)
            };
            let p = painter.paint(o, "#ddd6fe", "#6d28d9");
            let node = Node::group()
                .child(styled(Node::circle(n.x, n.y, r), &p))
                .child(Node::circle(n.x + r * 0.2, n.y - r * 0.15, r * 0.3).fill("#6d28d9"));
            (node, point(n.x, n.y + r + 12.0))
        }
        Organelle::EndoplasmicReticulum => {
            let s = if plant { at(50.0, 10.0) } else { at(22.0, -40.0) };
            let p = painter.paint(o, "none", "#0f766e");
            let mut d = String::new();
            for k in 0..3 {
                let y = s.y + 8.0 * k as f64;
                d.push_str(&format!(
                    "M{} {y} q8 -6 16 0 t16 0 t16 0 ",
                    fmt(s.x),
                    y = fmt(y)
                ));
            }
            let node = Node::path(d.trim_end().to_string())
                .fill("none")
                .stroke(p.stroke)
                .stroke_width(p.width);
            (node, point(s.x + 24.0, s.y - 8.0))
        }
        Organelle::Golgi => {
            let g = if plant { at(-95.0, -55.0) } else { at(70.0, 30.0) };
            let p = painter.paint(o, "none", "#b45309");
            let mut group = Node::group();
            for k in 0..4 {
                let w = 30.0 - 4.0 * k as f64;
                let y = g.y + 6.0 * k as f64;
                group.push(
                    Node::path(format!(
                        "M{} {} q{} -8 {} 0",
                        fmt(g.x - w / 2.0),
                        fmt(y),
                        fmt(w / 2.0),
                        fmt(w)
                    ))
                    .fill("none")
                    .stroke(p.stroke)
                    .stroke_width(p.width + 0.5),
                );
            }
            (group, point(g.x, g.y + 34.0))
        }
        Organelle::Mitochondria => {
            let p = painter.paint(o, "#fecaca", "#b91c1c");
            let spots = if plant {
                [at(40.0, 60.0), at(-110.0, 40.0)]
            } else {
                [at(-90.0, -40.0), at(60.0, 65.0)]
            };
            let mut group = Node::group();
            for m in spots {
                group.push(styled(Node::ellipse(m.x, m.y, 18.0, 9.0), &p));
                group.push(
                    Node::path(format!(
                        "M{} {} l5 -6 l5 12 l5 -12 l5 12 l5 -6",
                        fmt(m.x - 12.5),
                        fmt(m.y)
                    ))
                    .fill("none")
                    .stroke(p.stroke)
                    .stroke_width(1.0),
                );
            }
            (group, point(spots[0].x, spots[0].y + 22.0))
        }
        Organelle::Chloroplast => {
            let p = painter.paint(o, "#bbf7d0", "#15803d");
            let spots = [at(100.0, 30.0), at(-100.0, -70.0), at(10.0, -75.0)];
            let mut group = Node::group();
            for k in spots {
                group.push(styled(Node::ellipse(k.x, k.y, 20.0, 10.0), &p));
                for dx in [-8.0, 0.0, 8.0] {
                    group.push(
                        Node::line(k.x + dx, k.y - 5.0, k.x + dx, k.y + 5.0)
                            .stroke(p.stroke)
                            .stroke_width(1.0),
                    );
                }
            }
            (group, point(spots[0].x, spots[0].y + 22.0))
        }
        Organelle::Lysosome => {
            let p = painter.paint(o, "#fbcfe8", "#be185d");
            let spots = if plant {
                [at(-60.0, 75.0), at(110.0, -10.0)]
            } else {
                [at(-60.0, 55.0), at(100.0, -30.0)]
            };
            let group = Node::group().children(
                spots
                    .iter()
                    .map(|l| styled(Node::circle(l.x, l.y, 8.0), &p)),
            );
            (group, point(spots[0].x, spots[0].y + 20.0))
        }
        Organelle::Ribosome => {
            let p = painter.paint(o, "#374151", "#374151");
            let spots = [
                at(-70.0, -70.0),
                at(-55.0, -78.0),
                at(30.0, 80.0),
                at(45.0, 72.0),
                at(120.0, 10.0),
                at(-125.0, 5.0),
            ];
            let group = Node::group().children(
                spots
                    .iter()
                    .map(|r| Node::circle(r.x, r.y, 2.5).fill(p.fill).stroke(p.stroke)),
            );
            (group, point(spots[0].x, spots[0].y - 8.0))
        }
    };
    Some(out)
}
