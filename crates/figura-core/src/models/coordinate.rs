use super::{AxisRange, PlotPoint, Point2};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoordinateData {
    pub x_range: Option<AxisRange>,
    pub y_range: Option<AxisRange>,
    pub vectors: Vec<VectorArrow>,
    pub lines: Vec<LineSpec>,
    pub points: Vec<PlotPoint>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VectorArrow {
    #[serde(default = "origin", alias = "start")]
    pub from: Point2,
    #[serde(alias = "end")]
    pub to: Point2,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

fn origin() -> Point2 {
    Point2 { x: 0.0, y: 0.0 }
}

/// `y = slope * x + intercept`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineSpec {
    #[serde(alias = "k", alias = "m")]
    pub slope: f64,
    #[serde(default, alias = "b")]
    pub intercept: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}
