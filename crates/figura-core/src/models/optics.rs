use super::{AxisRange, normalize_word};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpticsData {
    pub axis_range: Option<AxisRange>,
    pub elements: Vec<OpticalElement>,
    #[serde(alias = "rayTracing", alias = "rays")]
    pub show_rays: bool,
}

impl Default for OpticsData {
    fn default() -> Self {
        Self {
            axis_range: None,
            elements: Vec::new(),
            show_rays: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpticalElement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(alias = "x")]
    pub position: f64,
    #[serde(default, alias = "f", alias = "focal")]
    pub focal_length: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpticalKind {
    ConvexLens,
    ConcaveLens,
    Object,
    Other,
}

impl OpticalElement {
    pub const DEFAULT_FOCAL_LENGTH: f64 = 10.0;
    pub const DEFAULT_HEIGHT: f64 = 2.0;

    pub fn optical_kind(&self) -> OpticalKind {
        match normalize_word(&self.kind).as_str() {
            "convex_lens" | "convex" | "converging_lens" | "lens" => OpticalKind::ConvexLens,
            "concave_lens" | "concave" | "diverging_lens" => OpticalKind::ConcaveLens,
            "object" | "candle" | "arrow" => OpticalKind::Object,
            _ => OpticalKind::Other,
        }
    }

    /// Unsigned focal length, falling back to the default for missing or unusable values.
    pub fn focal_magnitude(&self) -> f64 {
        self.focal_length
            .map(f64::abs)
            .filter(|f| f.is_finite() && *f > 1e-9)
            .unwrap_or(Self::DEFAULT_FOCAL_LENGTH)
    }

    pub fn object_height(&self) -> f64 {
        self.height
            .filter(|h| h.is_finite() && *h != 0.0)
            .unwrap_or(Self::DEFAULT_HEIGHT)
    }
}
