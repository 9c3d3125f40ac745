use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeometryData {
    pub points: Vec<GeoPoint>,
    #[serde(alias = "lines", alias = "edges")]
    pub segments: Vec<Segment>,
    pub angles: Vec<AngleMark>,
    pub circles: Vec<CircleSpec>,
    #[serde(alias = "auxiliaryLines", alias = "dashed")]
    pub auxiliary: Vec<Segment>,
    #[serde(alias = "edgeLabels")]
    pub labels: Vec<EdgeLabel>,
}

impl GeometryData {
    /// Declared points keyed by id in declaration order. The first declaration of an id wins.
    pub fn point_index(&self) -> IndexMap<&str, &GeoPoint> {
        let mut map = IndexMap::with_capacity(self.points.len());
        for p in &self.points {
            if p.x.is_finite() && p.y.is_finite() {
                map.entry(p.id.as_str()).or_insert(p);
            }
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoPoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub label: Option<String>,
}

impl GeoPoint {
    /// Visible label: explicit label, else the id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A segment between two named points.
///
/// Accepts `["A", "B"]`, `"AB"`, `"A-B"` or `{ "from": "A", "to": "B" }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "SegmentRepr")]
pub struct Segment {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub dashed: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SegmentRepr {
    Pair(String, String),
    Named(String),
    Object {
        from: String,
        to: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        dashed: bool,
    },
}

impl From<SegmentRepr> for Segment {
    fn from(value: SegmentRepr) -> Self {
        match value {
            SegmentRepr::Pair(from, to) => Self {
                from,
                to,
                label: None,
                dashed: false,
            },
            SegmentRepr::Named(name) => {
                let (from, to) = split_segment_name(&name);
                Self {
                    from,
                    to,
                    label: None,
                    dashed: false,
                }
            }
            SegmentRepr::Object {
                from,
                to,
                label,
                dashed,
            } => Self {
                from,
                to,
                label,
                dashed,
            },
        }
    }
}

fn split_segment_name(name: &str) -> (String, String) {
    let name = name.trim();
    if let Some((a, b)) = name.split_once('-') {
        return (a.trim().to_string(), b.trim().to_string());
    }
    let chars: Vec<char> = name.chars().collect();
    if chars.len() == 2 {
        return (chars[0].to_string(), chars[1].to_string());
    }
    // Unresolvable; the renderer will skip it as a dangling reference.
    (name.to_string(), String::new())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AngleValue {
    Number(f64),
    Text(String),
}

impl AngleValue {
    /// A right angle is exactly 90 degrees; text may carry a trailing `°` or `deg`.
    pub fn is_right_angle(&self) -> bool {
        self.degrees().is_some_and(|d| (d - 90.0).abs() < 1e-9)
    }

    /// Numeric degrees, when the value is numeric or numeric text.
    pub fn degrees(&self) -> Option<f64> {
        match self {
            AngleValue::Number(v) => Some(*v).filter(|v| v.is_finite()),
            AngleValue::Text(s) => {
                let t = s.trim();
                let t = t
                    .strip_suffix('°')
                    .or_else(|| t.strip_suffix("deg"))
                    .unwrap_or(t)
                    .trim();
                t.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        }
    }

    pub fn display(&self) -> String {
        match self {
            AngleValue::Number(v) => {
                if v.fract() == 0.0 && v.abs() < 1e9 {
                    format!("{}°", *v as i64)
                } else {
                    format!("{v}°")
                }
            }
            AngleValue::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleMark {
    pub vertex: String,
    /// Optional explicit `[a, vertex, b]` triple naming the two arms.
    #[serde(default)]
    pub points: Vec<String>,
    #[serde(default)]
    pub value: Option<AngleValue>,
    #[serde(default = "default_true", alias = "showMark")]
    pub mark: bool,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CircleSpec {
    pub center: String,
    pub radius: f64,
    #[serde(default)]
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeLabel {
    pub from: String,
    pub to: String,
    #[serde(alias = "label")]
    pub text: String,
}
