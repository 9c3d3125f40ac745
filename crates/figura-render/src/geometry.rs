use crate::geom::{Point, bearing_deg, bearing_delta, point, polar, unit, vector};
use crate::mapper::{Bounds, CoordinateMapper};
use crate::svg::{Node, SvgDocument, fmt};
use crate::{RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::geometry::{AngleMark, GeoPoint, GeometryData, Segment};
use indexmap::IndexMap;

const POINT_RADIUS: f64 = 3.0;
const LABEL_OFFSET: f64 = 12.0;
const RIGHT_ANGLE_SIZE: f64 = 10.0;
const ARC_RADIUS: f64 = 18.0;
const ANGLE_LABEL_RADIUS: f64 = 30.0;
const AUX_DASH: &str = "5 4";

struct Scene<'a> {
    index: IndexMap<&'a str, &'a GeoPoint>,
    mapper: CoordinateMapper,
    centroid: Point,
}

impl Scene<'_> {
    fn screen(&self, id: &str) -> Option<Point> {
        let p = self.index.get(id)?;
        Some(self.mapper.map(p.x, p.y))
    }

    fn segment_ends(&self, seg: &Segment) -> Option<(Point, Point)> {
        let a = self.screen(&seg.from)?;
        let b = self.screen(&seg.to)?;
        Some((a, b))
    }

    /// Offset of `len` pixels from `at`, pointing away from the figure's centroid.
    fn outward(&self, at: Point, len: f64) -> Point {
        let dir = unit(at - self.centroid).unwrap_or(vector(0.0, -1.0));
        at + dir * len
    }
}

pub fn render_geometry(data: &GeometryData, ctx: &RenderContext) -> Result<SvgDocument> {
    let canvas = ctx.canvas(DomainTag::Geometry);
    let index = data.point_index();

    let mut bounds = Bounds::from_points(index.values().map(|p| (p.x, p.y)));
    for c in &data.circles {
        let Some(center) = index.get(c.center.as_str()) else {
            continue;
        };
        if !(c.radius.is_finite() && c.radius > 0.0) {
            continue;
        }
        let b = bounds.get_or_insert(Bounds::new(center.x, center.x, center.y, center.y));
        b.include(center.x - c.radius, center.y - c.radius);
        b.include(center.x + c.radius, center.y + c.radius);
    }
    let mapper = CoordinateMapper::fit(bounds.unwrap_or_default(), canvas.viewport());

    let centroid = if index.is_empty() {
        point(canvas.width / 2.0, canvas.height / 2.0)
    } else {
        let n = index.len() as f64;
        let (sx, sy) = index
            .values()
            .map(|p| mapper.map(p.x, p.y))
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        point(sx / n, sy / n)
    };
    let scene = Scene {
        index,
        mapper,
        centroid,
    };

    let stroke = ctx.settings.stroke.as_str();
    let font_size = ctx.settings.font_size;
    let mut doc = ctx.document(DomainTag::Geometry, canvas.width, canvas.height);

    let mut circles = Node::group().class("circles");
    for c in &data.circles {
        let Some(center) = scene.screen(&c.center) else {
            tracing::debug!(center = %c.center, "geometry: circle center not declared");
            continue;
        };
        if !(c.radius.is_finite() && c.radius > 0.0) {
            continue;
        }
        let mut node = Node::circle(center.x, center.y, c.radius * scene.mapper.scale())
            .fill("none")
            .stroke(stroke)
            .stroke_width(1.5);
        if c.dashed {
            node = node.dashed(AUX_DASH);
        }
        circles.push(node);
    }
    doc.push(circles);

    let mut aux = Node::group().class("auxiliary");
    for seg in &data.auxiliary {
        let Some((a, b)) = scene.segment_ends(seg) else {
            tracing::debug!(from = %seg.from, to = %seg.to, "geometry: dangling auxiliary line");
            continue;
        };
        aux.push(
            Node::line(a.x, a.y, b.x, b.y)
                .stroke(crate::MUTED)
                .stroke_width(1.0)
                .dashed(AUX_DASH),
        );
    }
    doc.push(aux);

    let mut segments = Node::group().class("segments");
    for seg in &data.segments {
        let Some((a, b)) = scene.segment_ends(seg) else {
            tracing::debug!(from = %seg.from, to = %seg.to, "geometry: dangling segment");
            continue;
        };
        let mut line = Node::line(a.x, a.y, b.x, b.y)
            .stroke(stroke)
            .stroke_width(2.0);
        if seg.dashed {
            line = line.dashed(AUX_DASH);
        }
        segments.push(line);
        if let Some(label) = seg.label.as_deref().filter(|l| !l.is_empty()) {
            segments.push(edge_label(&scene, a, b, label, font_size));
        }
    }
    doc.push(segments);

    let mut angles = Node::group().class("angles");
    for mark in &data.angles {
        if let Some(node) = angle_mark(&scene, data, mark, ctx) {
            angles.push(node);
        }
    }
    doc.push(angles);

    let mut labels = Node::group().class("edge-labels");
    for label in &data.labels {
        let (Some(a), Some(b)) = (scene.screen(&label.from), scene.screen(&label.to)) else {
            tracing::debug!(from = %label.from, to = %label.to, "geometry: dangling edge label");
            continue;
        };
        labels.push(edge_label(&scene, a, b, &label.text, font_size));
    }
    doc.push(labels);

    let mut points = Node::group().class("points");
    for p in scene.index.values() {
        let at = scene.mapper.map(p.x, p.y);
        points.push(
            Node::circle(at.x, at.y, POINT_RADIUS)
                .fill(stroke)
                .class("point"),
        );
        let label_at = scene.outward(at, LABEL_OFFSET);
        points.push(
            Node::text(label_at.x, label_at.y, p.display_label())
                .class("point-label")
                .anchor("middle")
                .baseline("middle")
                .font_size(font_size + 1.0)
                .attr("font-style", "italic")
                .fill(stroke),
        );
    }
    doc.push(points);

    Ok(doc)
}

fn edge_label(scene: &Scene<'_>, a: Point, b: Point, text: &str, font_size: f64) -> Node {
    let mid = a.lerp(b, 0.5);
    let at = scene.outward(mid, 10.0);
    Node::text(at.x, at.y, text)
        .class("edge-label")
        .anchor("middle")
        .baseline("middle")
        .font_size(font_size)
        .fill(crate::DEFAULT_PALETTE[0])
}

/// The two arm endpoints of an angle: an explicit `[a, vertex, b]` triple, else the far ends of
/// the first two distinct segments meeting at the vertex.
fn angle_arms<'a>(data: &'a GeometryData, mark: &'a AngleMark) -> Option<(&'a str, &'a str)> {
    if mark.points.len() == 3 {
        return Some((mark.points[0].as_str(), mark.points[2].as_str()));
    }
    let mut found: Vec<&str> = Vec::with_capacity(2);
    for seg in data.segments.iter().chain(&data.auxiliary) {
        let other = if seg.from == mark.vertex {
            seg.to.as_str()
        } else if seg.to == mark.vertex {
            seg.from.as_str()
        } else {
            continue;
        };
        if other != mark.vertex && !found.contains(&other) {
            found.push(other);
            if found.len() == 2 {
                return Some((found[0], found[1]));
            }
        }
    }
    None
}

fn angle_mark(
    scene: &Scene<'_>,
    data: &GeometryData,
    mark: &AngleMark,
    ctx: &RenderContext,
) -> Option<Node> {
    let Some(v) = scene.screen(&mark.vertex) else {
        tracing::debug!(vertex = %mark.vertex, "geometry: angle vertex not declared");
        return None;
    };
    let Some((a_id, b_id)) = angle_arms(data, mark) else {
        tracing::debug!(vertex = %mark.vertex, "geometry: angle arms unresolved");
        return None;
    };
    let (a, b) = (scene.screen(a_id)?, scene.screen(b_id)?);
    let (ua, ub) = (unit(a - v)?, unit(b - v)?);

    let stroke = ctx.settings.color(1);
    let mut group = Node::group().class("angle");
    let right = mark.value.as_ref().is_some_and(|val| val.is_right_angle());

    let start = bearing_deg(v, a);
    let turn = bearing_delta(start, bearing_deg(v, b));

    if mark.mark {
        if right {
            let p1 = v + ua * RIGHT_ANGLE_SIZE;
            let p2 = p1 + ub * RIGHT_ANGLE_SIZE;
            let p3 = v + ub * RIGHT_ANGLE_SIZE;
            group.push(
                Node::path(format!(
                    "M{} {} L{} {} L{} {}",
                    fmt(p1.x),
                    fmt(p1.y),
                    fmt(p2.x),
                    fmt(p2.y),
                    fmt(p3.x),
                    fmt(p3.y)
                ))
                .class("angle-right")
                .fill("none")
                .stroke(stroke)
                .stroke_width(1.5),
            );
        } else {
            let p_start = polar(v, ARC_RADIUS, start);
            let p_end = polar(v, ARC_RADIUS, start + turn);
            let sweep = if turn > 0.0 { 1 } else { 0 };
            group.push(
                Node::path(format!(
                    "M{} {} A{r} {r} 0 0 {sweep} {} {}",
                    fmt(p_start.x),
                    fmt(p_start.y),
                    fmt(p_end.x),
                    fmt(p_end.y),
                    r = fmt(ARC_RADIUS),
                ))
                .class("angle-arc")
                .fill("none")
                .stroke(stroke)
                .stroke_width(1.5),
            );
        }
    }

    let text = mark
        .label
        .clone()
        .or_else(|| mark.value.as_ref().filter(|_| !right).map(|v| v.display()));
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        let at = polar(v, ANGLE_LABEL_RADIUS, start + turn / 2.0);
        group.push(
            Node::text(at.x, at.y, text)
                .class("angle-label")
                .anchor("middle")
                .baseline("middle")
                .font_size(ctx.settings.font_size - 1.0)
                .fill(stroke),
        );
    }

    (!group.is_empty_group()).then_some(group)
}
