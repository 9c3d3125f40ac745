//! Series circuits drawn as one rectangular loop.

use crate::geom::{Point, point};
use crate::svg::{Node, SvgDocument, fmt};
use crate::{Error, RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::circuit::{CircuitComponent, CircuitData, ComponentKind};

const LEFT: f64 = 60.0;
const TOP: f64 = 50.0;
const MIN_WIDTH: f64 = 240.0;
const MIN_HEIGHT: f64 = 140.0;
/// Perimeter length each component occupies.
pub const SLOT: f64 = 40.0;
/// Minimum center-to-center spacing of components sharing a side.
pub const PITCH: f64 = 56.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    fn of(index: usize) -> Self {
        match index % 4 {
            0 => Self::Top,
            1 => Self::Right,
            2 => Self::Bottom,
            _ => Self::Left,
        }
    }

    fn vertical(self) -> bool {
        matches!(self, Self::Right | Self::Left)
    }
}

/// The rectangular wire loop, walked clockwise from its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Loop {
    width: f64,
    height: f64,
}

impl Default for Loop {
    fn default() -> Self {
        Self {
            width: MIN_WIDTH,
            height: MIN_HEIGHT,
        }
    }
}

impl Loop {
    /// Large enough that components on the busiest side keep [`PITCH`] apart.
    fn for_counts(per_side: [usize; 4]) -> Self {
        let need = |n: usize| (n + 1) as f64 * PITCH;
        Self {
            width: MIN_WIDTH.max(need(per_side[0].max(per_side[2]))),
            height: MIN_HEIGHT.max(need(per_side[1].max(per_side[3]))),
        }
    }

    fn right(&self) -> f64 {
        LEFT + self.width
    }

    fn bottom(&self) -> f64 {
        TOP + self.height
    }

    /// Perimeter offset where `side` starts.
    fn start(&self, side: Side) -> f64 {
        let (w, h) = (self.width, self.height);
        match side {
            Side::Top => 0.0,
            Side::Right => w,
            Side::Bottom => w + h,
            Side::Left => 2.0 * w + h,
        }
    }

    fn length(&self, side: Side) -> f64 {
        if side.vertical() { self.height } else { self.width }
    }

    fn perimeter(&self) -> f64 {
        2.0 * (self.width + self.height)
    }

    /// Point at clockwise perimeter offset `s`, wrapping.
    fn at_offset(&self, s: f64) -> Point {
        let (w, h) = (self.width, self.height);
        let s = s.rem_euclid(self.perimeter());
        if s <= w {
            point(LEFT + s, TOP)
        } else if s <= w + h {
            point(self.right(), TOP + (s - w))
        } else if s <= 2.0 * w + h {
            point(self.right() - (s - w - h), self.bottom())
        } else {
            point(LEFT, self.bottom() - (s - 2.0 * w - h))
        }
    }

    /// Wire from offset `a` to offset `b` (clockwise, `b > a`), turning at every corner between.
    fn wire(&self, a: f64, b: f64) -> Vec<(f64, f64)> {
        let total = self.perimeter();
        let corners = [Side::Top, Side::Right, Side::Bottom, Side::Left].map(|s| self.start(s));
        let mut out = vec![self.at_offset(a)];
        let mut lap = (a / total).floor() * total;
        while lap < b {
            for c in corners {
                let s = lap + c;
                if s > a && s < b {
                    out.push(self.at_offset(s));
                }
            }
            lap += total;
        }
        out.push(self.at_offset(b));
        out.into_iter().map(|p| (p.x, p.y)).collect()
    }
}

struct Placement<'a> {
    component: &'a CircuitComponent,
    side: Side,
    /// Perimeter offset of the component's center.
    offset: f64,
}

fn place(components: &[CircuitComponent]) -> (Loop, Vec<Placement<'_>>) {
    let mut per_side = [0usize; 4];
    for i in 0..components.len() {
        per_side[i % 4] += 1;
    }
    let frame = Loop::for_counts(per_side);
    let mut seen = [0usize; 4];
    let mut out: Vec<Placement<'_>> = components
        .iter()
        .enumerate()
        .map(|(i, component)| {
            let side = Side::of(i);
            let k = seen[i % 4];
            seen[i % 4] += 1;
            let t = (k + 1) as f64 / (per_side[i % 4] + 1) as f64;
            Placement {
                component,
                side,
                offset: frame.start(side) + frame.length(side) * t,
            }
        })
        .collect();
    out.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    (frame, out)
}

pub fn render_circuit(data: &CircuitData, ctx: &RenderContext) -> Result<SvgDocument> {
    if data.components.is_empty() {
        return Err(Error::missing(DomainTag::Circuit, "no components"));
    }
    let canvas = ctx.canvas(DomainTag::Circuit);
    let stroke = ctx.settings.stroke.as_str();
    let (frame, placements) = place(&data.components);
    let width = canvas.width.max(frame.right() + LEFT);
    let height = canvas.height.max(frame.bottom() + TOP);
    let mut doc = ctx.document(DomainTag::Circuit, width, height);
    let half = SLOT / 2.0;

    let mut wires = Node::group().class("wires");
    let n = placements.len();
    for (i, cur) in placements.iter().enumerate() {
        let next = &placements[(i + 1) % n];
        let a = cur.offset + half;
        let mut b = next.offset - half;
        if i + 1 == n {
            b += frame.perimeter();
        }
        if b - a <= 1e-6 {
            continue;
        }
        wires.push(
            Node::polyline(&frame.wire(a, b))
                .stroke(stroke)
                .stroke_width(2.0),
        );
    }
    doc.push(wires);

    let mut parts = Node::group().class("components");
    for p in &placements {
        let center = frame.at_offset(p.offset);
        let kind = p.component.component_kind();
        let mut transform = format!("translate({},{})", fmt(center.x), fmt(center.y));
        if p.side.vertical() {
            transform.push_str(" rotate(90)");
        }
        parts.push(
            glyph(kind, &p.component.kind, stroke, ctx.settings.font_size)
                .class(format!("component component-{}", glyph_class(kind)))
                .transform(transform),
        );
        if let Some(label) = p.component.label.as_deref().filter(|l| !l.is_empty()) {
            let (x, y, anchor) = match p.side {
                Side::Top => (center.x, center.y - 20.0, "middle"),
                Side::Bottom => (center.x, center.y + 30.0, "middle"),
                Side::Right => (center.x + 22.0, center.y + 4.0, "start"),
                Side::Left => (center.x - 22.0, center.y + 4.0, "end"),
            };
            parts.push(
                Node::text(x, y, label)
                    .class("component-label")
                    .anchor(anchor)
                    .font_size(ctx.settings.font_size)
                    .fill(stroke),
            );
        }
    }
    doc.push(parts);

    Ok(doc)
}

fn glyph_class(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Battery => "battery",
        ComponentKind::Resistor => "resistor",
        ComponentKind::Capacitor => "capacitor",
        ComponentKind::Switch => "switch",
        ComponentKind::Ammeter => "ammeter",
        ComponentKind::Voltmeter => "voltmeter",
        ComponentKind::Bulb => "bulb",
        ComponentKind::Other => "other",
    }
}

fn lead(x1: f64, x2: f64, stroke: &str) -> Node {
    Node::line(x1, 0.0, x2, 0.0).stroke(stroke).stroke_width(2.0)
}

/// A component glyph centered on the origin, spanning `[-20, 20]` along x.
fn glyph(kind: ComponentKind, raw_kind: &str, stroke: &str, font_size: f64) -> Node {
    let g = Node::group();
    match kind {
        ComponentKind::Battery => g
            .child(lead(-20.0, -3.0, stroke))
            .child(lead(3.0, 20.0, stroke))
            .child(
                Node::line(-3.0, -12.0, -3.0, 12.0)
                    .stroke(stroke)
                    .stroke_width(2.0),
            )
            .child(
                Node::line(3.0, -6.0, 3.0, 6.0)
                    .stroke(stroke)
                    .stroke_width(4.0),
            ),
        ComponentKind::Resistor => {
            let mut pts = vec![(-20.0, 0.0), (-14.0, 0.0)];
            for k in 0..6 {
                let x = -14.0 + (k as f64 + 0.5) * 28.0 / 6.0;
                let y = if k % 2 == 0 { -6.0 } else { 6.0 };
                pts.push((x, y));
            }
            pts.push((14.0, 0.0));
            pts.push((20.0, 0.0));
            g.child(
                Node::polyline(&pts)
                    .stroke(stroke)
                    .stroke_width(2.0)
                    .attr("stroke-linejoin", "round"),
            )
        }
        ComponentKind::Capacitor => g
            .child(lead(-20.0, -3.0, stroke))
            .child(lead(3.0, 20.0, stroke))
            .child(
                Node::line(-3.0, -12.0, -3.0, 12.0)
                    .stroke(stroke)
                    .stroke_width(2.0),
            )
            .child(
                Node::line(3.0, -12.0, 3.0, 12.0)
                    .stroke(stroke)
                    .stroke_width(2.0),
            ),
        ComponentKind::Switch => g
            .child(lead(-20.0, -10.0, stroke))
            .child(lead(10.0, 20.0, stroke))
            .child(Node::circle(-10.0, 0.0, 2.0).fill(stroke))
            .child(Node::circle(10.0, 0.0, 2.0).fill(stroke))
            .child(
                Node::line(-10.0, 0.0, 9.0, -11.0)
                    .stroke(stroke)
                    .stroke_width(2.0),
            ),
        ComponentKind::Ammeter | ComponentKind::Voltmeter => {
            let letter = if kind == ComponentKind::Ammeter { "A" } else { "V" };
            g.child(lead(-20.0, -12.0, stroke))
                .child(lead(12.0, 20.0, stroke))
                .child(
                    Node::circle(0.0, 0.0, 12.0)
                        .fill("#ffffff")
                        .stroke(stroke)
                        .stroke_width(2.0),
                )
                .child(
                    Node::text(0.0, 0.0, letter)
                        .anchor("middle")
                        .baseline("central")
                        .font_size(font_size)
                        .attr("font-weight", "bold")
                        .fill(stroke),
                )
        }
        ComponentKind::Bulb => {
            let d = 12.0 * std::f64::consts::FRAC_1_SQRT_2;
            g.child(lead(-20.0, -12.0, stroke))
                .child(lead(12.0, 20.0, stroke))
                .child(
                    Node::circle(0.0, 0.0, 12.0)
                        .fill("#fef9c3")
                        .stroke(stroke)
                        .stroke_width(2.0),
                )
                .child(Node::line(-d, -d, d, d).stroke(stroke).stroke_width(1.5))
                .child(Node::line(-d, d, d, -d).stroke(stroke).stroke_width(1.5))
        }
        ComponentKind::Other => {
            let text: String = raw_kind.chars().take(8).collect();
            g.child(lead(-20.0, -16.0, stroke))
                .child(lead(16.0, 20.0, stroke))
                .child(
                    Node::rect(-16.0, -10.0, 32.0, 20.0)
                        .fill("#ffffff")
                        .stroke(stroke)
                        .stroke_width(1.5),
                )
                .child(
                    Node::text(0.0, 0.0, text)
                        .anchor("middle")
                        .baseline("central")
                        .font_size((font_size - 4.0).max(7.0))
                        .fill(stroke),
                )
        }
    }
}
