//! Typed per-domain payloads of a diagram specification.
//!
//! Every struct here deserializes from the camelCase JSON that upstream producers emit. Optional
//! fields carry documented defaults so renderers never have to probe raw JSON.

pub mod apparatus;
pub mod cell;
pub mod circuit;
pub mod climate;
pub mod coordinate;
pub mod force;
pub mod function_graph;
pub mod generic;
pub mod geometry;
pub mod molecule;
pub mod optics;
pub mod process_flow;
pub mod reaction;

use serde::Deserialize;

/// A `[low, high]` pair as written in the spec. Normalization happens in the mapper.
pub type AxisRange = [f64; 2];

/// A point written either as `[x, y]` or as `{ "x": .., "y": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "Point2Repr")]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Point2Repr {
    Pair(f64, f64),
    Object { x: f64, y: f64 },
}

impl From<Point2Repr> for Point2 {
    fn from(value: Point2Repr) -> Self {
        match value {
            Point2Repr::Pair(x, y) | Point2Repr::Object { x, y } => Self { x, y },
        }
    }
}

/// A marked point on a plot (function graph or coordinate plane).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "PlotPointRepr")]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub label: Option<String>,
    pub color: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlotPointRepr {
    Pair(f64, f64),
    Object {
        x: f64,
        y: f64,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
}

impl From<PlotPointRepr> for PlotPoint {
    fn from(value: PlotPointRepr) -> Self {
        match value {
            PlotPointRepr::Pair(x, y) => Self {
                x,
                y,
                label: None,
                color: None,
            },
            PlotPointRepr::Object { x, y, label, color } => Self { x, y, label, color },
        }
    }
}

/// Normalizes a free-form vocabulary word: lowercase, `-`/space folded to `_`.
pub fn normalize_word(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
