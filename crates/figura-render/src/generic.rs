//! Pixel-space primitives for specs no domain renderer claims.

use crate::dispatch::Rendered;
use crate::svg::{Node, arrow};
use crate::{RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::generic::{GenericData, GenericElement, Paint};

fn finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// The text shown when there is nothing to draw.
pub fn description_text(data: &GenericData, title: Option<&str>, declared_type: &str) -> String {
    let pick = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    pick(data.description.as_deref())
        .or_else(|| pick(title))
        .unwrap_or_else(|| {
            let ty = declared_type.trim();
            format!("Diagram: {}", if ty.is_empty() { "generic" } else { ty })
        })
}

fn painted(node: Node, paint: &Paint, fill: &str, stroke: &str) -> Node {
    let mut node = node
        .fill(paint.fill.as_deref().unwrap_or(fill))
        .stroke(paint.stroke.as_deref().unwrap_or(stroke));
    if let Some(w) = paint.stroke_width.filter(|w| w.is_finite() && *w >= 0.0) {
        node = node.stroke_width(w);
    }
    node
}

fn centered_label(x: f64, y: f64, text: &str, ctx: &RenderContext) -> Node {
    Node::text(x, y, text)
        .anchor("middle")
        .baseline("central")
        .font_size(ctx.settings.font_size)
        .fill(ctx.settings.stroke.as_str())
}

pub fn render_generic(
    data: &GenericData,
    title: Option<&str>,
    declared_type: &str,
    ctx: &RenderContext,
) -> Result<Rendered> {
    let canvas = ctx.canvas(DomainTag::Generic);
    let width = Some(data.width)
        .filter(|w| w.is_finite() && *w >= 1.0)
        .unwrap_or(canvas.width);
    let height = Some(data.height)
        .filter(|h| h.is_finite() && *h >= 1.0)
        .unwrap_or(canvas.height);
    let stroke = ctx.settings.stroke.as_str();

    let mut shapes = Node::group().class("elements");
    for el in &data.elements {
        match el {
            GenericElement::Rect {
                x,
                y,
                width,
                height,
                label,
                paint,
            } if finite(&[*x, *y, *width, *height]) => {
                shapes.push(painted(Node::rect(*x, *y, *width, *height), paint, "none", stroke));
                if let Some(label) = label.as_deref().filter(|l| !l.is_empty()) {
                    shapes.push(centered_label(x + width / 2.0, y + height / 2.0, label, ctx));
                }
            }
            GenericElement::Circle {
                cx,
                cy,
                r,
                label,
                paint,
            } if finite(&[*cx, *cy, *r]) => {
                shapes.push(painted(Node::circle(*cx, *cy, r.abs()), paint, "none", stroke));
                if let Some(label) = label.as_deref().filter(|l| !l.is_empty()) {
                    shapes.push(centered_label(*cx, *cy, label, ctx));
                }
            }
            GenericElement::Ellipse {
                cx,
                cy,
                rx,
                ry,
                paint,
            } if finite(&[*cx, *cy, *rx, *ry]) => {
                shapes.push(painted(
                    Node::ellipse(*cx, *cy, rx.abs(), ry.abs()),
                    paint,
                    "none",
                    stroke,
                ));
            }
            GenericElement::Line {
                x1,
                y1,
                x2,
                y2,
                dashed,
                paint,
            } if finite(&[*x1, *y1, *x2, *y2]) => {
                let mut line = painted(Node::line(*x1, *y1, *x2, *y2), paint, "none", stroke);
                if *dashed {
                    line = line.dashed("6 4");
                }
                shapes.push(line);
            }
            GenericElement::Arrow {
                x1,
                y1,
                x2,
                y2,
                label,
                paint,
            } if finite(&[*x1, *y1, *x2, *y2]) => {
                let color = paint.stroke.as_deref().unwrap_or(stroke);
                let width = paint.stroke_width.filter(|w| w.is_finite()).unwrap_or(1.5);
                if let Some(node) = arrow((*x1, *y1), (*x2, *y2), color, width) {
                    shapes.push(node);
                }
                if let Some(label) = label.as_deref().filter(|l| !l.is_empty()) {
                    shapes.push(
                        Node::text((x1 + x2) / 2.0, (y1 + y2) / 2.0 - 6.0, label)
                            .anchor("middle")
                            .font_size(ctx.settings.font_size)
                            .fill(color),
                    );
                }
            }
            GenericElement::Text {
                x,
                y,
                text,
                font_size,
                paint,
            } if finite(&[*x, *y]) && !text.is_empty() => {
                let size = font_size
                    .filter(|s| s.is_finite() && *s > 0.0)
                    .unwrap_or(ctx.settings.font_size);
                let mut node = Node::text(*x, *y, text.as_str())
                    .font_size(size)
                    .fill(paint.fill.as_deref().unwrap_or(stroke));
                if let Some(s) = paint.stroke.as_deref() {
                    node = node.stroke(s);
                }
                shapes.push(node);
            }
            other => {
                tracing::debug!(element = ?other, "generic: element skipped");
            }
        }
    }

    if shapes.is_empty_group() {
        return Ok(Rendered::Description(description_text(
            data,
            title,
            declared_type,
        )));
    }
    let mut doc = ctx.document(DomainTag::Generic, width, height);
    doc.push(shapes);
    Ok(Rendered::Svg(doc))
}
