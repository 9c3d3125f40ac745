//! Process flowcharts: a host layout engine when installed, else a row layout.

use crate::capability::Surface;
use crate::dispatch::Rendered;
use crate::geom::{Point, Vector, point, unit};
use crate::svg::{Node, SvgDocument, arrow};
use crate::text::{TextStyle, fit_font_size, wrap_words};
use crate::{Error, RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::process_flow::{FlowData, FlowEdge, FlowNode, NodeShape};

pub const MAX_PER_ROW: usize = 4;
pub const ROW_HEIGHT: f64 = 90.0;
const BASE_HEIGHT: f64 = 40.0;
const BOX_HEIGHT: f64 = 44.0;
const MAX_BOX_WIDTH: f64 = 110.0;
const NODE_FILL: &str = "#eff6ff";

/// Declared edges, or links between consecutive nodes when none are declared.
pub fn effective_edges(data: &FlowData) -> Vec<FlowEdge> {
    if !data.edges.is_empty() {
        return data.edges.clone();
    }
    let ids: Vec<&str> = data.node_index().keys().copied().collect();
    ids.windows(2)
        .map(|w| FlowEdge {
            from: w[0].to_string(),
            to: w[1].to_string(),
            label: None,
        })
        .collect()
}

pub fn flow_height(node_count: usize) -> f64 {
    let rows = node_count.div_ceil(MAX_PER_ROW).max(1);
    BASE_HEIGHT + ROW_HEIGHT * rows as f64
}

pub fn render_flow(data: &FlowData, ctx: &RenderContext) -> Result<Rendered> {
    if data.nodes.is_empty() {
        return Err(Error::missing(DomainTag::ProcessFlow, "no nodes"));
    }
    let canvas = ctx.canvas(DomainTag::ProcessFlow);
    let index = data.node_index();
    let nodes: Vec<FlowNode> = index.values().map(|(_, n)| (*n).clone()).collect();
    let edges = effective_edges(data);
    let height = canvas.height.max(flow_height(nodes.len()));

    if let Some(engine) = ctx.collaborators.flow() {
        let surface = Surface {
            id: ctx.next_id(),
            width: canvas.width,
            height,
        };
        match engine.render(&nodes, &edges, &surface) {
            Ok(markup) => return Ok(Rendered::Markup(markup)),
            Err(err) => {
                tracing::debug!(error = %err, "flow: layout engine failed, using row layout");
            }
        }
    }
    Ok(Rendered::Svg(row_layout(&nodes, &edges, height, ctx)))
}

struct Placed<'a> {
    node: &'a FlowNode,
    center: Point,
    half: Vector,
}

impl Placed<'_> {
    /// Where the ray from the center towards `dir` leaves the node's box.
    fn border(&self, dir: Vector) -> Point {
        let tx = if dir.x.abs() > 1e-9 {
            self.half.x / dir.x.abs()
        } else {
            f64::INFINITY
        };
        let ty = if dir.y.abs() > 1e-9 {
            self.half.y / dir.y.abs()
        } else {
            f64::INFINITY
        };
        let t = tx.min(ty);
        if t.is_finite() {
            self.center + dir * t
        } else {
            self.center
        }
    }
}

fn row_layout(
    nodes: &[FlowNode],
    edges: &[FlowEdge],
    height: f64,
    ctx: &RenderContext,
) -> SvgDocument {
    let canvas = ctx.canvas(DomainTag::ProcessFlow);
    let stroke = ctx.settings.stroke.as_str();
    let mut doc = ctx.document(DomainTag::ProcessFlow, canvas.width, height);

    let cols = nodes.len().min(MAX_PER_ROW).max(1);
    let slot = (canvas.width - 2.0 * canvas.padding).max(1.0) / cols as f64;
    let box_w = (slot - 24.0).clamp(30.0, MAX_BOX_WIDTH);
    let placed: Vec<Placed<'_>> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let (row, col) = (i / MAX_PER_ROW, i % MAX_PER_ROW);
            Placed {
                node,
                center: point(
                    canvas.padding + slot * (col as f64 + 0.5),
                    BASE_HEIGHT / 2.0 + ROW_HEIGHT * row as f64 + ROW_HEIGHT / 2.0,
                ),
                half: Vector::new(box_w / 2.0, BOX_HEIGHT / 2.0),
            }
        })
        .collect();
    let find = |id: &str| placed.iter().find(|p| p.node.id == id);

    let mut edge_group = Node::group().class("edges");
    for edge in edges {
        let (Some(a), Some(b)) = (find(&edge.from), find(&edge.to)) else {
            tracing::debug!(from = %edge.from, to = %edge.to, "flow: dangling edge skipped");
            continue;
        };
        let Some(dir) = unit(b.center - a.center) else {
            continue;
        };
        let (start, end) = (a.border(dir) + dir * 2.0, b.border(-dir) - dir * 2.0);
        if let Some(node) = arrow((start.x, start.y), (end.x, end.y), stroke, 1.5) {
            edge_group.push(node);
        }
        if let Some(label) = edge.label.as_deref().filter(|l| !l.trim().is_empty()) {
            let mid = start.lerp(end, 0.5);
            let size = ctx.settings.font_size - 2.0;
            let w = ctx.measure_width(label, size) + 8.0;
            edge_group.push(
                Node::group()
                    .class("edge-label")
                    .child(
                        Node::rounded_rect(mid.x - w / 2.0, mid.y - 8.0, w, 16.0, 3.0)
                            .fill("#ffffff")
                            .stroke(crate::MUTED)
                            .stroke_width(0.8),
                    )
                    .child(
                        Node::text(mid.x, mid.y, label)
                            .anchor("middle")
                            .baseline("central")
                            .font_size(size)
                            .fill(stroke),
                    ),
            );
        }
    }

    let mut node_group = Node::group().class("nodes");
    for p in &placed {
        node_group.push(node_glyph(p, stroke, ctx));
    }
    doc.push(node_group);
    doc.push(edge_group);
    doc
}

fn node_glyph(p: &Placed<'_>, stroke: &str, ctx: &RenderContext) -> Node {
    let (c, hw, hh) = (p.center, p.half.x, p.half.y);
    let shape = match p.node.node_shape() {
        NodeShape::Rect => Node::rect(c.x - hw, c.y - hh, hw * 2.0, hh * 2.0),
        NodeShape::Rounded => Node::rounded_rect(c.x - hw, c.y - hh, hw * 2.0, hh * 2.0, hh),
        NodeShape::Diamond => Node::polygon(&[
            (c.x, c.y - hh),
            (c.x + hw, c.y),
            (c.x, c.y + hh),
            (c.x - hw, c.y),
        ]),
        NodeShape::Circle => Node::ellipse(c.x, c.y, hw, hh),
        NodeShape::Parallelogram => Node::polygon(&[
            (c.x - hw + 10.0, c.y - hh),
            (c.x + hw, c.y - hh),
            (c.x + hw - 10.0, c.y + hh),
            (c.x - hw, c.y + hh),
        ]),
    }
    .fill(NODE_FILL)
    .stroke(ctx.settings.color(0))
    .stroke_width(1.5);

    let inner_w = match p.node.node_shape() {
        NodeShape::Diamond | NodeShape::Circle => hw * 1.3,
        _ => hw * 2.0 - 8.0,
    };
    let text = p.node.display_text().trim();
    let style = TextStyle::sized(ctx.settings.font_size);
    let mut lines = wrap_words(ctx.measurer.as_ref(), text, &style, inner_w);
    if lines.len() > 2 {
        let rest = lines.split_off(1).join(" ");
        lines.push(rest);
    }
    let size = lines
        .iter()
        .map(|l| fit_font_size(ctx.measurer.as_ref(), l, inner_w, ctx.settings.font_size, 8.0))
        .fold(ctx.settings.font_size, f64::min);
    let line_h = size * 1.15;
    let first_y = c.y - line_h * (lines.len() as f64 - 1.0) / 2.0;
    let mut label = Node::new("text")
        .num("x", c.x)
        .num("y", first_y)
        .anchor("middle")
        .baseline("central")
        .font_size(size)
        .fill(stroke);
    for (i, line) in lines.into_iter().enumerate() {
        let mut span = Node::tspan(line).num("x", c.x);
        if i > 0 {
            span = span.num("dy", line_h);
        }
        label.push(span);
    }

    Node::group()
        .class("flow-node")
        .attr("data-id", p.node.id.clone())
        .child(shape)
        .child(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(ids: &[&str]) -> FlowData {
        FlowData {
            nodes: ids
                .iter()
                .map(|id| FlowNode {
                    id: id.to_string(),
                    text: String::new(),
                    shape: None,
                })
                .collect(),
            edges: Vec::new(),
        }
    }

    #[test]
    fn consecutive_nodes_are_linked_without_edges() {
        let edges = effective_edges(&flow(&["a", "b", "c"]));
        let pairs: Vec<(&str, &str)> = edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "b"), ("b", "c")]);
    }

    #[test]
    fn height_grows_per_row() {
        assert_eq!(flow_height(1), 130.0);
        assert_eq!(flow_height(4), 130.0);
        assert_eq!(flow_height(5), 220.0);
    }

    #[test]
    fn border_point_lies_on_the_box() {
        let node = FlowNode {
            id: "n".to_string(),
            text: String::new(),
            shape: None,
        };
        let p = Placed {
            node: &node,
            center: point(100.0, 50.0),
            half: Vector::new(40.0, 20.0),
        };
        assert_eq!(p.border(Vector::new(1.0, 0.0)), point(140.0, 50.0));
        assert_eq!(p.border(Vector::new(0.0, -1.0)), point(100.0, 30.0));
    }
}
