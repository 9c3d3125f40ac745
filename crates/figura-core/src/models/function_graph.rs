use super::{AxisRange, PlotPoint};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FunctionGraphData {
    pub x_range: Option<AxisRange>,
    pub y_range: Option<AxisRange>,
    pub grid_step: Option<f64>,
    #[serde(alias = "curves")]
    pub functions: Vec<FunctionCurve>,
    pub points: Vec<PlotPoint>,
    pub vertical_asymptotes: Vec<f64>,
    pub horizontal_asymptotes: Vec<f64>,
    /// Nested `{ vertical, horizontal }` form; merged with the flat lists.
    pub asymptotes: Asymptotes,
}

impl FunctionGraphData {
    pub fn all_vertical_asymptotes(&self) -> impl Iterator<Item = f64> + '_ {
        self.vertical_asymptotes
            .iter()
            .chain(self.asymptotes.vertical.iter())
            .copied()
            .filter(|v| v.is_finite())
    }

    pub fn all_horizontal_asymptotes(&self) -> impl Iterator<Item = f64> + '_ {
        self.horizontal_asymptotes
            .iter()
            .chain(self.asymptotes.horizontal.iter())
            .copied()
            .filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Asymptotes {
    pub vertical: Vec<f64>,
    pub horizontal: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionCurve {
    #[serde(alias = "expression", alias = "fn")]
    pub expr: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    /// Boolean shorthand for `style: "dashed"`, as on geometry segments.
    #[serde(default)]
    pub dashed: bool,
}

impl FunctionCurve {
    pub fn is_dashed(&self) -> bool {
        self.dashed
            || matches!(
                self.style.as_deref().map(str::trim),
                Some("dashed" | "dash" | "dotted")
            )
    }
}
