//! Typed SVG primitives and the rooted document they serialize into.
//!
//! Builders are stateless: every node is a plain value that owns its attributes and children, and
//! serialization writes straight into a `String` without an intermediate DOM.

mod util;

pub use util::{escape_xml, escape_xml_into, fmt, fmt_into, points_attr};

use std::fmt::Write as _;

/// Side length of every arrow head, in pixels.
pub const ARROW_HEAD_SIZE: f64 = 8.0;
/// Extra height reserved below the canvas for a title caption.
pub const CAPTION_HEIGHT: f64 = 24.0;
pub const CAPTION_FONT_SIZE: f64 = 13.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new("line")
            .num("x1", x1)
            .num("y1", y1)
            .num("x2", x2)
            .num("y2", y2)
    }

    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Self::new("circle").num("cx", cx).num("cy", cy).num("r", r)
    }

    pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        Self::new("ellipse")
            .num("cx", cx)
            .num("cy", cy)
            .num("rx", rx)
            .num("ry", ry)
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new("rect")
            .num("x", x)
            .num("y", y)
            .num("width", width.max(0.0))
            .num("height", height.max(0.0))
    }

    pub fn rounded_rect(x: f64, y: f64, width: f64, height: f64, radius: f64) -> Self {
        Self::rect(x, y, width, height)
            .num("rx", radius)
            .num("ry", radius)
    }

    pub fn polygon(points: &[(f64, f64)]) -> Self {
        Self::new("polygon").attr("points", points_attr(points))
    }

    pub fn polyline(points: &[(f64, f64)]) -> Self {
        Self::new("polyline")
            .attr("points", points_attr(points))
            .fill("none")
    }

    pub fn path(d: impl Into<String>) -> Self {
        Self::new("path").attr("d", d)
    }

    pub fn text(x: f64, y: f64, content: impl Into<String>) -> Self {
        let mut node = Self::new("text").num("x", x).num("y", y);
        node.text = Some(content.into());
        node
    }

    /// A `<tspan>` run, used for subscripts and multi-line labels.
    pub fn tspan(content: impl Into<String>) -> Self {
        let mut node = Self::new("tspan");
        node.text = Some(content.into());
        node
    }

    pub fn group() -> Self {
        Self::new("g")
    }

    pub fn clip_path(id: impl Into<String>, shape: Node) -> Self {
        Self::new("clipPath").attr("id", id).child(shape)
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn children_nodes(&self) -> &[Node] {
        &self.children
    }

    /// Sets an attribute, replacing an earlier value of the same name.
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    pub fn num(self, name: &'static str, value: f64) -> Self {
        self.attr(name, fmt(value))
    }

    pub fn fill(self, color: impl Into<String>) -> Self {
        self.attr("fill", color)
    }

    pub fn stroke(self, color: impl Into<String>) -> Self {
        self.attr("stroke", color)
    }

    pub fn stroke_width(self, width: f64) -> Self {
        self.num("stroke-width", width)
    }

    pub fn dashed(self, pattern: &str) -> Self {
        self.attr("stroke-dasharray", pattern)
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    pub fn transform(self, transform: impl Into<String>) -> Self {
        self.attr("transform", transform)
    }

    pub fn font_size(self, size: f64) -> Self {
        self.num("font-size", size)
    }

    pub fn anchor(self, anchor: &str) -> Self {
        self.attr("text-anchor", anchor)
    }

    pub fn baseline(self, baseline: &str) -> Self {
        self.attr("dominant-baseline", baseline)
    }

    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn is_empty_group(&self) -> bool {
        self.tag == "g" && self.children.is_empty()
    }

    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            escape_xml_into(out, v);
            out.push('"');
        }
        if self.text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            escape_xml_into(out, text);
        }
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}

/// Filled triangular head whose tip sits at `tip`, pointing away from `from`.
pub fn arrow_head(from: (f64, f64), tip: (f64, f64), size: f64) -> Option<Node> {
    let (dx, dy) = (tip.0 - from.0, tip.1 - from.1);
    let len = dx.hypot(dy);
    if !len.is_finite() || len < 1e-9 {
        return None;
    }
    let (ux, uy) = (dx / len, dy / len);
    let base = (tip.0 - ux * size, tip.1 - uy * size);
    let half = size * 0.5;
    let left = (base.0 - uy * half, base.1 + ux * half);
    let right = (base.0 + uy * half, base.1 - ux * half);
    Some(Node::polygon(&[tip, left, right]))
}

/// Shaft plus head, as one group. The shaft stops at the head's base so thick strokes stay
/// behind the tip. Zero-length arrows yield `None`.
pub fn arrow(from: (f64, f64), to: (f64, f64), color: &str, width: f64) -> Option<Node> {
    let head = arrow_head(from, to, ARROW_HEAD_SIZE)?;
    let len = (to.0 - from.0).hypot(to.1 - from.1);
    let shaft_len = (len - ARROW_HEAD_SIZE * 0.8).max(0.0);
    let k = shaft_len / len;
    let shaft_end = (from.0 + (to.0 - from.0) * k, from.1 + (to.1 - from.1) * k);
    Some(
        Node::group()
            .class("arrow")
            .child(
                Node::line(from.0, from.1, shaft_end.0, shaft_end.1)
                    .stroke(color)
                    .stroke_width(width),
            )
            .child(head.fill(color)),
    )
}

/// One rooted `<svg>` document with a fixed `viewBox`.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub class: String,
    pub title: Option<String>,
    pub font_family: String,
    pub defs: Vec<Node>,
    pub children: Vec<Node>,
}

impl SvgDocument {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width: width.max(1.0),
            height: height.max(1.0),
            class: "figura".to_string(),
            title: None,
            font_family: "sans-serif".to_string(),
            defs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn with_title(mut self, title: Option<&str>) -> Self {
        self.title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn push(&mut self, node: Node) {
        if !node.is_empty_group() {
            self.children.push(node);
        }
    }

    pub fn push_def(&mut self, node: Node) {
        self.defs.push(node);
    }

    /// Canvas height including the caption band.
    pub fn total_height(&self) -> f64 {
        if self.title.is_some() {
            self.height + CAPTION_HEIGHT
        } else {
            self.height
        }
    }

    pub fn to_svg_string(&self) -> String {
        let total_height = self.total_height();
        let mut out = String::new();
        let _ = write!(
            &mut out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" id="{id}" class="{class}" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}" role="img">"#,
            id = escape_xml(&self.id),
            class = escape_xml(&self.class),
            w = fmt(self.width),
            h = fmt(total_height),
            font = escape_xml(&self.font_family),
        );
        if let Some(title) = &self.title {
            out.push_str("<title>");
            escape_xml_into(&mut out, title);
            out.push_str("</title>");
        }
        if !self.defs.is_empty() {
            out.push_str("<defs>");
            for def in &self.defs {
                def.write_to(&mut out);
            }
            out.push_str("</defs>");
        }
        for child in &self.children {
            child.write_to(&mut out);
        }
        if let Some(title) = &self.title {
            Node::text(self.width / 2.0, self.height + CAPTION_HEIGHT / 2.0 + 4.0, title.as_str())
                .class("figura-caption")
                .anchor("middle")
                .font_size(CAPTION_FONT_SIZE)
                .fill("#374151")
                .write_to(&mut out);
        }
        out.push_str("</svg>");
        out
    }
}
