use super::normalize_word;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceData {
    pub object: ObjectDescriptor,
    pub surface: SurfaceDescriptor,
    pub forces: Vec<ForceSpec>,
    #[serde(alias = "notes")]
    pub annotations: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObjectDescriptor {
    #[serde(rename = "type", alias = "shape")]
    pub kind: Option<String>,
    pub label: Option<String>,
}

impl ObjectDescriptor {
    pub fn is_ball(&self) -> bool {
        matches!(
            self.kind.as_deref().map(normalize_word).as_deref(),
            Some("ball" | "sphere" | "circle")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceKind {
    #[default]
    Flat,
    Incline,
    None,
}

impl From<String> for SurfaceKind {
    fn from(value: String) -> Self {
        match normalize_word(&value).as_str() {
            "incline" | "inclined" | "inclined_plane" | "slope" | "ramp" => Self::Incline,
            "none" | "air" | "hanging" => Self::None,
            _ => Self::Flat,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SurfaceDescriptor {
    #[serde(rename = "type", deserialize_with = "surface_kind")]
    pub kind: SurfaceKind,
    /// Incline angle in degrees.
    pub angle: Option<f64>,
}

fn surface_kind<'de, D>(de: D) -> Result<SurfaceKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.map(SurfaceKind::from).unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForceSpec {
    #[serde(alias = "type")]
    pub direction: ForceDirection,
    #[serde(default)]
    pub magnitude: Magnitude,
    #[serde(default)]
    pub label: Option<String>,
}

/// The fixed direction vocabulary. Anything else is kept as `Unknown` and drawn as nothing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ForceDirection {
    Down,
    Up,
    Normal,
    Left,
    Right,
    FrictionUp,
    FrictionDown,
    FrictionLeft,
    FrictionRight,
    Applied,
    Unknown(String),
}

impl From<String> for ForceDirection {
    fn from(value: String) -> Self {
        match normalize_word(&value).as_str() {
            "down" | "gravity" | "weight" => Self::Down,
            "up" | "tension" | "lift" => Self::Up,
            "normal" | "support" => Self::Normal,
            "left" => Self::Left,
            "right" => Self::Right,
            "friction_up" => Self::FrictionUp,
            "friction_down" => Self::FrictionDown,
            "friction_left" | "friction" => Self::FrictionLeft,
            "friction_right" => Self::FrictionRight,
            "applied" | "push" | "pull" => Self::Applied,
            _ => Self::Unknown(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Value")]
pub enum Magnitude {
    Small,
    #[default]
    Medium,
    Large,
}

impl From<Value> for Magnitude {
    fn from(value: Value) -> Self {
        match value.as_str().map(normalize_word).as_deref() {
            Some("small" | "weak" | "s") => Self::Small,
            Some("large" | "big" | "strong" | "l") => Self::Large,
            _ => Self::Medium,
        }
    }
}

impl Magnitude {
    /// Arrow length in canvas pixels.
    pub fn arrow_length(self) -> f64 {
        match self {
            Magnitude::Small => 40.0,
            Magnitude::Medium => 60.0,
            Magnitude::Large => 85.0,
        }
    }
}
