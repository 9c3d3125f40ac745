use crate::geom::{point, unit, vector};
use crate::mapper::{Bounds, CoordinateMapper, clip_segment, nice_step, ticks};
use crate::svg::{Node, SvgDocument, arrow, arrow_head, fmt};
use crate::{RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::coordinate::CoordinateData;

const DEFAULT_RANGE: [f64; 2] = [-5.0, 5.0];
const GRID_COLOR: &str = "#e5e7eb";

fn content_bounds(data: &CoordinateData) -> Bounds {
    let fallback = Bounds::new(
        DEFAULT_RANGE[0],
        DEFAULT_RANGE[1],
        DEFAULT_RANGE[0],
        DEFAULT_RANGE[1],
    );
    if data.vectors.is_empty() && data.points.is_empty() {
        return fallback;
    }
    let mut pts = vec![(0.0, 0.0)];
    for v in &data.vectors {
        pts.push((v.from.x, v.from.y));
        pts.push((v.to.x, v.to.y));
    }
    pts.extend(data.points.iter().map(|p| (p.x, p.y)));
    match Bounds::from_points(pts) {
        Some(b) => Bounds::new(b.min_x - 1.0, b.max_x + 1.0, b.min_y - 1.0, b.max_y + 1.0),
        None => fallback,
    }
}

pub fn render_coordinate(data: &CoordinateData, ctx: &RenderContext) -> Result<SvgDocument> {
    let canvas = ctx.canvas(DomainTag::CoordinateVector);
    let content = content_bounds(data);
    let (x_lo, x_hi) = data
        .x_range
        .map(|r| (r[0], r[1]))
        .unwrap_or((content.min_x, content.max_x));
    let (y_lo, y_hi) = data
        .y_range
        .map(|r| (r[0], r[1]))
        .unwrap_or((content.min_y, content.max_y));
    let bounds = Bounds::new(x_lo, x_hi, y_lo, y_hi).normalized();
    let mapper = CoordinateMapper::fit(bounds, canvas.viewport());
    let plot = mapper.plot_rect();
    let stroke = ctx.settings.stroke.as_str();
    let font_size = ctx.settings.font_size;

    let mut doc = ctx.document(DomainTag::CoordinateVector, canvas.width, canvas.height);

    let step = |span: f64| if span > 20.0 { nice_step(span, 10.0) } else { 1.0 };
    let xs = ticks(bounds.min_x, bounds.max_x, step(bounds.width()), 100);
    let ys = ticks(bounds.min_y, bounds.max_y, step(bounds.height()), 100);
    let mut grid = Node::group().class("grid");
    for &x in &xs {
        let px = mapper.map_x(x);
        grid.push(Node::line(px, plot.min_y(), px, plot.max_y()).stroke(GRID_COLOR));
    }
    for &y in &ys {
        let py = mapper.map_y(y);
        grid.push(Node::line(plot.min_x(), py, plot.max_x(), py).stroke(GRID_COLOR));
    }
    doc.push(grid);

    let axis_y = if bounds.contains_y(0.0) {
        mapper.map_y(0.0)
    } else {
        plot.max_y()
    };
    let axis_x = if bounds.contains_x(0.0) {
        mapper.map_x(0.0)
    } else {
        plot.min_x()
    };
    let mut axes = Node::group().class("axes");
    let x_end = (plot.max_x() + 10.0, axis_y);
    let y_end = (axis_x, plot.min_y() - 10.0);
    axes.push(Node::line(plot.min_x(), axis_y, x_end.0, x_end.1).stroke(stroke));
    axes.push(Node::line(axis_x, plot.max_y(), y_end.0, y_end.1).stroke(stroke));
    if let Some(head) = arrow_head((plot.min_x(), axis_y), x_end, 7.0) {
        axes.push(head.fill(stroke));
    }
    if let Some(head) = arrow_head((axis_x, plot.max_y()), y_end, 7.0) {
        axes.push(head.fill(stroke));
    }
    axes.push(
        Node::text(x_end.0 + 2.0, x_end.1 + 14.0, "x")
            .attr("font-style", "italic")
            .font_size(font_size)
            .fill(stroke),
    );
    axes.push(
        Node::text(y_end.0 + 8.0, y_end.1 + 4.0, "y")
            .attr("font-style", "italic")
            .font_size(font_size)
            .fill(stroke),
    );
    let tick_size = (font_size - 3.0).max(8.0);
    for &x in xs.iter().filter(|x| **x != 0.0) {
        axes.push(
            Node::text(mapper.map_x(x), axis_y + 12.0, fmt(x))
                .class("tick-label")
                .anchor("middle")
                .font_size(tick_size)
                .fill(crate::MUTED),
        );
    }
    for &y in ys.iter().filter(|y| **y != 0.0) {
        axes.push(
            Node::text(axis_x - 4.0, mapper.map_y(y) + 3.0, fmt(y))
                .class("tick-label")
                .anchor("end")
                .font_size(tick_size)
                .fill(crate::MUTED),
        );
    }
    doc.push(axes);

    let mut lines = Node::group().class("lines");
    for (i, line) in data.lines.iter().enumerate() {
        if !(line.slope.is_finite() && line.intercept.is_finite()) {
            continue;
        }
        let at = |x: f64| mapper.map(x, line.slope * x + line.intercept);
        let Some((a, b)) = clip_segment(at(bounds.min_x), at(bounds.max_x), &plot) else {
            continue;
        };
        let color = line
            .color
            .clone()
            .unwrap_or_else(|| ctx.settings.color(i + 2).to_string());
        lines.push(
            Node::line(a.x, a.y, b.x, b.y)
                .stroke(color.as_str())
                .stroke_width(1.8),
        );
        if let Some(label) = line.label.as_deref().filter(|l| !l.is_empty()) {
            lines.push(
                Node::text(b.x - 4.0, b.y - 6.0, label)
                    .anchor("end")
                    .font_size(font_size)
                    .fill(color.as_str()),
            );
        }
    }
    doc.push(lines);

    let mut vectors = Node::group().class("vectors");
    for (i, v) in data.vectors.iter().enumerate() {
        let (from, to) = (mapper.map(v.from.x, v.from.y), mapper.map(v.to.x, v.to.y));
        let color = v
            .color
            .clone()
            .unwrap_or_else(|| ctx.settings.color(i).to_string());
        let Some(node) = arrow((from.x, from.y), (to.x, to.y), &color, 2.0) else {
            continue;
        };
        vectors.push(node);
        if let Some(label) = v.label.as_deref().filter(|l| !l.is_empty()) {
            let dir = unit(to - from).unwrap_or(vector(1.0, 0.0));
            let normal = vector(dir.y, -dir.x);
            let mid = from.lerp(to, 0.5) + normal * 12.0;
            vectors.push(
                Node::text(mid.x, mid.y, label)
                    .anchor("middle")
                    .baseline("middle")
                    .attr("font-weight", "bold")
                    .font_size(font_size)
                    .fill(color.as_str()),
            );
        }
    }
    doc.push(vectors);

    let mut points = Node::group().class("points");
    for p in &data.points {
        if !bounds.contains(p.x, p.y) {
            continue;
        }
        let at = mapper.map(p.x, p.y);
        let color = p.color.clone().unwrap_or_else(|| stroke.to_string());
        points.push(Node::circle(at.x, at.y, 3.5).fill(color.as_str()));
        if let Some(label) = p.label.as_deref().filter(|l| !l.is_empty()) {
            let at = point(at.x + 6.0, at.y - 6.0);
            points.push(
                Node::text(at.x, at.y, label)
                    .font_size(font_size)
                    .fill(stroke),
            );
        }
    }
    doc.push(points);

    Ok(doc)
}
