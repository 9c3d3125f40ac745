use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenericData {
    pub width: f64,
    pub height: f64,
    pub description: Option<String>,
    #[serde(alias = "shapes", alias = "primitives")]
    pub elements: Vec<GenericElement>,
}

impl Default for GenericData {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
            description: None,
            elements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Paint {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GenericElement {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        #[serde(default)]
        label: Option<String>,
        #[serde(flatten)]
        paint: Paint,
    },
    Circle {
        #[serde(alias = "x")]
        cx: f64,
        #[serde(alias = "y")]
        cy: f64,
        r: f64,
        #[serde(default)]
        label: Option<String>,
        #[serde(flatten)]
        paint: Paint,
    },
    Ellipse {
        #[serde(alias = "x")]
        cx: f64,
        #[serde(alias = "y")]
        cy: f64,
        rx: f64,
        ry: f64,
        #[serde(flatten)]
        paint: Paint,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        #[serde(default)]
        dashed: bool,
        #[serde(flatten)]
        paint: Paint,
    },
    Arrow {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        #[serde(default)]
        label: Option<String>,
        #[serde(flatten)]
        paint: Paint,
    },
    Text {
        x: f64,
        y: f64,
        #[serde(alias = "content")]
        text: String,
        #[serde(default, rename = "fontSize")]
        font_size: Option<f64>,
        #[serde(flatten)]
        paint: Paint,
    },
    #[serde(other)]
    Unknown,
}
