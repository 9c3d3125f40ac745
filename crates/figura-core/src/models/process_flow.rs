use super::normalize_word;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlowData {
    #[serde(alias = "steps")]
    pub nodes: Vec<FlowNode>,
    #[serde(alias = "links", alias = "connections")]
    pub edges: Vec<FlowEdge>,
}

impl FlowData {
    /// Nodes keyed by id in declaration order; duplicate ids keep the first node.
    pub fn node_index(&self) -> IndexMap<&str, (usize, &FlowNode)> {
        let mut map = IndexMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let next = map.len();
            map.entry(node.id.as_str()).or_insert((next, node));
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(default, alias = "label")]
    pub text: String,
    #[serde(default)]
    pub shape: Option<String>,
}

impl FlowNode {
    pub fn display_text(&self) -> &str {
        if self.text.trim().is_empty() {
            &self.id
        } else {
            &self.text
        }
    }

    pub fn node_shape(&self) -> NodeShape {
        match self.shape.as_deref().map(normalize_word).as_deref() {
            Some("rounded" | "round" | "start" | "end" | "terminal" | "stadium") => {
                NodeShape::Rounded
            }
            Some("diamond" | "decision" | "rhombus") => NodeShape::Diamond,
            Some("circle" | "ellipse" | "oval") => NodeShape::Circle,
            Some("parallelogram" | "io" | "input" | "output") => NodeShape::Parallelogram,
            _ => NodeShape::Rect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Rect,
    Rounded,
    Diamond,
    Circle,
    Parallelogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub label: Option<String>,
}
