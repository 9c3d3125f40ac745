//! Free-body diagrams on flat ground or an inclined plane.

use crate::geom::{Point, Vector, point, vector};
use crate::svg::{Node, SvgDocument, arrow, fmt};
use crate::{RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::force::{ForceData, ForceDirection, ForceSpec, SurfaceKind};

const GROUND_Y: f64 = 200.0;
const OBJECT_CENTER: (f64, f64) = (180.0, 170.0);
const HALF_W: f64 = 35.0;
const HALF_H: f64 = 30.0;
pub const MIN_INCLINE_DEG: f64 = 5.0;
pub const MAX_INCLINE_DEG: f64 = 75.0;
const DEFAULT_INCLINE_DEG: f64 = 30.0;

/// Unit direction of a force in incline-local coordinates (x up the slope, y into the slope).
/// `angle_deg == 0` gives plain screen directions. Unknown directions have none.
pub fn local_direction(direction: &ForceDirection, angle_deg: f64) -> Option<Vector> {
    let incline = angle_deg != 0.0;
    let a = angle_deg.to_radians();
    let (s, c) = (a.sin(), a.cos());
    // World-frame vectors turned into the rotated frame.
    let world = |x: f64, y: f64| vector(x * c - y * s, x * s + y * c);
    Some(match direction {
        ForceDirection::Down => world(0.0, 1.0),
        ForceDirection::Up => world(0.0, -1.0),
        ForceDirection::Left => world(-1.0, 0.0),
        ForceDirection::Right => world(1.0, 0.0),
        ForceDirection::Normal => vector(0.0, -1.0),
        ForceDirection::Applied | ForceDirection::FrictionRight => vector(1.0, 0.0),
        ForceDirection::FrictionLeft => vector(-1.0, 0.0),
        ForceDirection::FrictionUp if incline => vector(1.0, 0.0),
        ForceDirection::FrictionUp => vector(0.0, -1.0),
        ForceDirection::FrictionDown if incline => vector(-1.0, 0.0),
        ForceDirection::FrictionDown => vector(0.0, 1.0),
        ForceDirection::Unknown(_) => return None,
    })
}

fn is_friction(direction: &ForceDirection) -> bool {
    matches!(
        direction,
        ForceDirection::FrictionUp
            | ForceDirection::FrictionDown
            | ForceDirection::FrictionLeft
            | ForceDirection::FrictionRight
    )
}

fn default_label(direction: &ForceDirection) -> &'static str {
    match direction {
        ForceDirection::Down => "G",
        ForceDirection::Up => "T",
        ForceDirection::Normal => "N",
        ForceDirection::FrictionUp
        | ForceDirection::FrictionDown
        | ForceDirection::FrictionLeft
        | ForceDirection::FrictionRight => "f",
        ForceDirection::Applied | ForceDirection::Left | ForceDirection::Right => "F",
        ForceDirection::Unknown(_) => "",
    }
}

fn force_color(direction: &ForceDirection, ctx: &RenderContext) -> String {
    let i = match direction {
        ForceDirection::Down => 1,
        ForceDirection::Normal => 0,
        ForceDirection::Up => 4,
        ForceDirection::Applied | ForceDirection::Left | ForceDirection::Right => 3,
        _ => 2,
    };
    ctx.settings.color(i).to_string()
}

/// Arrows for every known force, drawn from `center` (friction from `contact`).
fn force_arrows(
    forces: &[ForceSpec],
    angle_deg: f64,
    center: Point,
    contact: Point,
    reach: f64,
    ctx: &RenderContext,
) -> Node {
    let mut group = Node::group().class("forces");
    for force in forces {
        let Some(dir) = local_direction(&force.direction, angle_deg) else {
            tracing::debug!(direction = ?force.direction, "force: unknown direction skipped");
            continue;
        };
        let origin = if is_friction(&force.direction) {
            contact
        } else {
            center
        };
        let len = force.magnitude.arrow_length() + if origin == center { reach } else { 0.0 };
        let tip = origin + dir * len;
        let color = force_color(&force.direction, ctx);
        if let Some(node) = arrow((origin.x, origin.y), (tip.x, tip.y), &color, 2.5) {
            group.push(node);
        }
        let text = force
            .label
            .as_deref()
            .unwrap_or_else(|| default_label(&force.direction));
        if !text.is_empty() {
            let at = tip + dir * 12.0;
            group.push(
                Node::text(at.x, at.y, text)
                    .class("force-label")
                    .anchor("middle")
                    .baseline("middle")
                    .attr("font-style", "italic")
                    .font_size(ctx.settings.font_size + 1.0)
                    .fill(color.as_str()),
            );
        }
    }
    group
}

fn object_glyph(data: &ForceData, center: Point, stroke: &str) -> Node {
    let mut group = Node::group().class("object");
    if data.object.is_ball() {
        group.push(
            Node::circle(center.x, center.y, HALF_H)
                .fill("#dbeafe")
                .stroke(stroke)
                .stroke_width(1.5),
        );
    } else {
        group.push(
            Node::rect(center.x - HALF_W, center.y - HALF_H, HALF_W * 2.0, HALF_H * 2.0)
                .fill("#dbeafe")
                .stroke(stroke)
                .stroke_width(1.5),
        );
    }
    if let Some(label) = data.object.label.as_deref().filter(|l| !l.is_empty()) {
        group.push(
            Node::text(center.x, center.y, label)
                .anchor("middle")
                .baseline("middle")
                .font_size(12.0)
                .fill(stroke),
        );
    }
    group
}

pub fn render_force(data: &ForceData, ctx: &RenderContext) -> Result<SvgDocument> {
    let canvas = ctx.canvas(DomainTag::Force);
    let stroke = ctx.settings.stroke.as_str();
    let mut doc = ctx.document(DomainTag::Force, canvas.width, canvas.height);
    let reach = if data.object.is_ball() { HALF_H } else { HALF_H.max(HALF_W) };

    match data.surface.kind {
        SurfaceKind::Incline => {
            let angle = data
                .surface
                .angle
                .filter(|a| a.is_finite())
                .unwrap_or(DEFAULT_INCLINE_DEG)
                .clamp(MIN_INCLINE_DEG, MAX_INCLINE_DEG);
            draw_incline(&mut doc, data, angle, reach, ctx);
        }
        kind => {
            let center = point(OBJECT_CENTER.0, OBJECT_CENTER.1);
            if kind == SurfaceKind::Flat {
                let mut ground = Node::group().class("ground");
                ground.push(
                    Node::line(40.0, GROUND_Y, 320.0, GROUND_Y)
                        .stroke(stroke)
                        .stroke_width(2.0),
                );
                let mut x = 45.0;
                while x <= 320.0 {
                    ground.push(Node::line(x, GROUND_Y, x - 10.0, GROUND_Y + 10.0).stroke(stroke));
                    x += 15.0;
                }
                doc.push(ground);
            }
            doc.push(object_glyph(data, center, stroke));
            let contact = point(center.x, center.y + HALF_H);
            doc.push(force_arrows(&data.forces, 0.0, center, contact, reach, ctx));
        }
    }

    let mut notes = Node::group().class("annotations");
    for (i, note) in data.annotations.iter().enumerate() {
        notes.push(
            Node::text(12.0, 20.0 + 16.0 * i as f64, note.as_str())
                .font_size(ctx.settings.font_size)
                .fill(stroke),
        );
    }
    doc.push(notes);

    Ok(doc)
}

fn draw_incline(
    doc: &mut SvgDocument,
    data: &ForceData,
    angle: f64,
    reach: f64,
    ctx: &RenderContext,
) {
    let stroke = ctx.settings.stroke.as_str();
    let a = angle.to_radians();
    let base_y = 220.0;
    let right_x = 320.0;
    let run = 280.0_f64.min(170.0 / a.tan());
    let foot = point(right_x - run, base_y);
    let corner = point(right_x, base_y);
    let top = point(right_x, base_y - run * a.tan());

    doc.push(
        Node::polygon(&[(foot.x, foot.y), (corner.x, corner.y), (top.x, top.y)])
            .class("incline")
            .fill("#f3f4f6")
            .stroke(stroke)
            .stroke_width(2.0),
    );

    let arc_r = 30.0;
    let arc_end = point(foot.x + arc_r * a.cos(), foot.y - arc_r * a.sin());
    doc.push(
        Node::path(format!(
            "M{} {} A{r} {r} 0 0 0 {} {}",
            fmt(foot.x + arc_r),
            fmt(foot.y),
            fmt(arc_end.x),
            fmt(arc_end.y),
            r = fmt(arc_r)
        ))
        .class("incline-angle")
        .fill("none")
        .stroke(stroke),
    );
    let label_at = point(
        foot.x + 44.0 * (a / 2.0).cos(),
        foot.y - 44.0 * (a / 2.0).sin() + 4.0,
    );
    doc.push(
        Node::text(label_at.x, label_at.y, format!("{}°", fmt(angle)))
            .font_size(ctx.settings.font_size)
            .fill(stroke),
    );

    let mid = foot.lerp(top, 0.5);
    let center = point(0.0, -HALF_H);
    let contact = point(0.0, 0.0);
    let body = Node::group()
        .class("incline-body")
        .transform(format!(
            "translate({},{}) rotate({})",
            fmt(mid.x),
            fmt(mid.y),
            fmt(-angle)
        ))
        .child(object_glyph(data, center, stroke))
        .child(force_arrows(&data.forces, angle, center, contact, reach, ctx));
    doc.push(body);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(v: Vector, x: f64, y: f64) -> bool {
        (v.x - x).abs() < 1e-9 && (v.y - y).abs() < 1e-9
    }

    #[test]
    fn flat_directions_are_screen_directions() {
        let dir = |d: ForceDirection| local_direction(&d, 0.0).unwrap();
        assert!(close(dir(ForceDirection::Down), 0.0, 1.0));
        assert!(close(dir(ForceDirection::Normal), 0.0, -1.0));
        assert!(close(dir(ForceDirection::FrictionUp), 0.0, -1.0));
        assert!(close(dir(ForceDirection::FrictionLeft), -1.0, 0.0));
    }

    #[test]
    fn incline_turns_world_forces_into_slope_axes() {
        let (s, c) = (30f64.to_radians().sin(), 30f64.to_radians().cos());
        let dir = |d: ForceDirection| local_direction(&d, 30.0).unwrap();
        assert!(close(dir(ForceDirection::Down), -s, c));
        assert!(close(dir(ForceDirection::Up), s, -c));
        assert!(close(dir(ForceDirection::Right), c, s));
        // Slope-bound forces stay on the local axes.
        assert!(close(dir(ForceDirection::Normal), 0.0, -1.0));
        assert!(close(dir(ForceDirection::FrictionUp), 1.0, 0.0));
        assert!(close(dir(ForceDirection::FrictionDown), -1.0, 0.0));
        assert!(close(dir(ForceDirection::Applied), 1.0, 0.0));
    }

    #[test]
    fn unknown_direction_has_no_vector() {
        let unknown = ForceDirection::Unknown("sideways".to_string());
        assert_eq!(local_direction(&unknown, 0.0), None);
        assert_eq!(local_direction(&unknown, 45.0), None);
    }
}
