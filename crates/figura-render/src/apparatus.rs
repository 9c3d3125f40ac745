//! Laboratory set-ups: one glyph per piece of equipment in equal slots.

use crate::svg::{Node, SvgDocument, fmt};
use crate::{Error, RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::apparatus::{ApparatusData, Equipment, EquipmentKind};

const BASE_Y: f64 = 150.0;
/// Natural glyph width; slots narrower than this scale glyphs down.
const GLYPH_WIDTH: f64 = 64.0;
const GLASS_FILL: &str = "#f8fafc";
const LIQUID_FILL: &str = "#93c5fd";
const TUBE_COLOR: &str = "#9ca3af";

fn kind_name(kind: EquipmentKind) -> &'static str {
    match kind {
        EquipmentKind::Flask => "flask",
        EquipmentKind::Beaker => "beaker",
        EquipmentKind::Tube => "test-tube",
        EquipmentKind::Lamp => "lamp",
        EquipmentKind::Funnel => "funnel",
        EquipmentKind::GasJar => "gas-jar",
        EquipmentKind::Other => "other",
    }
}

fn display_name(kind: EquipmentKind) -> &'static str {
    match kind {
        EquipmentKind::Flask => "Flask",
        EquipmentKind::Beaker => "Beaker",
        EquipmentKind::Tube => "Test tube",
        EquipmentKind::Lamp => "Alcohol lamp",
        EquipmentKind::Funnel => "Funnel",
        EquipmentKind::GasJar => "Gas jar",
        EquipmentKind::Other => "",
    }
}

/// Height of the glyph's mouth above its base, before scaling.
fn mouth_height(kind: EquipmentKind) -> f64 {
    match kind {
        EquipmentKind::Flask | EquipmentKind::Tube => 100.0,
        EquipmentKind::Funnel => 90.0,
        EquipmentKind::GasJar => 84.0,
        EquipmentKind::Beaker | EquipmentKind::Lamp => 70.0,
        EquipmentKind::Other => 60.0,
    }
}

/// Half-width of a cone that is `bottom_hw` wide at `bottom` and `top_hw` wide at `top`.
fn cone_half_width(y: f64, bottom: f64, bottom_hw: f64, top: f64, top_hw: f64) -> f64 {
    let t = (y - bottom) / (top - bottom);
    bottom_hw + (top_hw - bottom_hw) * t
}

/// Glyph in local coordinates: base centered on the origin, growing towards negative y.
fn glyph(item: &Equipment, stroke: &str, font_size: f64) -> Node {
    let kind = item.equipment_kind();
    let filled = item
        .content
        .as_deref()
        .is_some_and(|c| !c.trim().is_empty());
    let glass = |node: Node| node.fill(GLASS_FILL).stroke(stroke).stroke_width(2.0);
    let liquid = |node: Node| node.fill(LIQUID_FILL).attr("fill-opacity", "0.8");
    let mut g = Node::group();

    match kind {
        EquipmentKind::Flask => {
            g.push(glass(Node::polygon(&[
                (-6.0, -100.0),
                (6.0, -100.0),
                (6.0, -70.0),
                (30.0, 0.0),
                (-30.0, 0.0),
                (-6.0, -70.0),
            ])));
            if filled {
                let hw = cone_half_width(-25.0, 0.0, 30.0, -70.0, 6.0);
                g.push(liquid(Node::polygon(&[
                    (-hw, -25.0),
                    (hw, -25.0),
                    (29.0, -1.0),
                    (-29.0, -1.0),
                ])));
            }
        }
        EquipmentKind::Beaker => {
            g.push(glass(Node::path("M-28 -70 L-28 0 L28 0 L28 -70 M-28 -70 L-33 -74")));
            if filled {
                g.push(liquid(Node::rect(-27.0, -35.0, 54.0, 34.0)));
            }
        }
        EquipmentKind::Tube => {
            g.push(glass(Node::path("M-9 -100 L-9 -12 A9 9 0 0 0 9 -12 L9 -100")));
            if filled {
                g.push(liquid(Node::path("M-8 -45 L-8 -12 A8 8 0 0 0 8 -12 L8 -45 Z")));
            }
        }
        EquipmentKind::Lamp => {
            g.push(glass(Node::path("M-26 0 L26 0 L22 -30 Q0 -40 -22 -30 Z")));
            if filled {
                g.push(liquid(Node::path("M-25 -1 L25 -1 L23 -14 L-23 -14 Z")));
            }
            g.push(Node::line(0.0, -36.0, 0.0, -44.0).stroke(stroke).stroke_width(2.0));
            g.push(
                Node::path("M0 -70 Q10 -52 0 -44 Q-10 -52 0 -70 Z")
                    .class("flame")
                    .fill("#f97316")
                    .attr("fill-opacity", "0.85"),
            );
        }
        EquipmentKind::Funnel => {
            g.push(glass(Node::polygon(&[
                (-30.0, -90.0),
                (30.0, -90.0),
                (4.0, -50.0),
                (4.0, -10.0),
                (-4.0, -10.0),
                (-4.0, -50.0),
            ])));
            if filled {
                let hw = cone_half_width(-75.0, -50.0, 4.0, -90.0, 30.0);
                g.push(liquid(Node::polygon(&[
                    (-hw, -75.0),
                    (hw, -75.0),
                    (3.0, -51.0),
                    (-3.0, -51.0),
                ])));
            }
        }
        EquipmentKind::GasJar => {
            g.push(glass(Node::rect(-22.0, -80.0, 44.0, 80.0)));
            g.push(glass(Node::rect(-26.0, -86.0, 52.0, 6.0)));
            if filled {
                g.push(
                    Node::rect(-21.0, -79.0, 42.0, 78.0)
                        .fill("#e0f2fe")
                        .attr("fill-opacity", "0.9"),
                );
            }
        }
        EquipmentKind::Other => {
            g.push(glass(Node::rect(-28.0, -60.0, 56.0, 60.0)).fill("#ffffff"));
            let text: String = item.kind.chars().take(10).collect();
            g.push(
                Node::text(0.0, -30.0, text)
                    .anchor("middle")
                    .baseline("central")
                    .font_size((font_size - 2.0).max(8.0))
                    .fill(stroke),
            );
        }
    }
    g
}

pub fn render_apparatus(data: &ApparatusData, ctx: &RenderContext) -> Result<SvgDocument> {
    if data.equipment.is_empty() {
        return Err(Error::missing(DomainTag::Apparatus, "no equipment"));
    }
    let canvas = ctx.canvas(DomainTag::Apparatus);
    let stroke = ctx.settings.stroke.as_str();
    let font_size = ctx.settings.font_size;
    let mut doc = ctx.document(DomainTag::Apparatus, canvas.width, canvas.height);

    let n = data.equipment.len();
    let usable = (canvas.width - 2.0 * canvas.padding).max(1.0);
    let slot = usable / n as f64;
    let scale = ((slot - 8.0) / GLYPH_WIDTH).clamp(0.25, 1.0);
    let center_x = |i: usize| canvas.padding + slot * (i as f64 + 0.5);

    let mut tubes = Node::group().class("connections");
    for (i, pair) in data.equipment.windows(2).enumerate() {
        let (a, b) = (pair[0].equipment_kind(), pair[1].equipment_kind());
        if a == EquipmentKind::Lamp || b == EquipmentKind::Lamp {
            continue;
        }
        let (xa, xb) = (center_x(i), center_x(i + 1));
        let (ya, yb) = (
            BASE_Y - mouth_height(a) * scale,
            BASE_Y - mouth_height(b) * scale,
        );
        let bridge = ya.min(yb) - 14.0 * scale;
        tubes.push(
            Node::polyline(&[(xa, ya + 6.0), (xa, bridge), (xb, bridge), (xb, yb + 6.0)])
                .stroke(TUBE_COLOR)
                .stroke_width(3.0)
                .attr("stroke-linejoin", "round"),
        );
    }

    let mut items = Node::group().class("equipment");
    for (i, item) in data.equipment.iter().enumerate() {
        let kind = item.equipment_kind();
        let x = center_x(i);
        items.push(
            glyph(item, stroke, font_size)
                .class(format!("equipment-item equipment-{}", kind_name(kind)))
                .transform(format!(
                    "translate({},{}) scale({})",
                    fmt(x),
                    fmt(BASE_Y),
                    fmt(scale)
                )),
        );
        let label = item
            .label
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| display_name(kind));
        if !label.is_empty() {
            items.push(
                Node::text(x, BASE_Y + 20.0, label)
                    .class("equipment-label")
                    .anchor("middle")
                    .font_size(font_size)
                    .fill(stroke),
            );
        }
        if let Some(content) = item.content.as_deref().filter(|c| !c.trim().is_empty()) {
            items.push(
                Node::text(x, BASE_Y + 35.0, content.trim())
                    .class("equipment-content")
                    .anchor("middle")
                    .font_size(font_size - 2.0)
                    .fill(crate::MUTED),
            );
        }
    }
    doc.push(items);
    doc.push(tubes);

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cone_interpolates_between_rims() {
        assert_eq!(cone_half_width(0.0, 0.0, 30.0, -70.0, 6.0), 30.0);
        assert_eq!(cone_half_width(-70.0, 0.0, 30.0, -70.0, 6.0), 6.0);
        assert_eq!(cone_half_width(-35.0, 0.0, 30.0, -70.0, 6.0), 18.0);
    }
}
