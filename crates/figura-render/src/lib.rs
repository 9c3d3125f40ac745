#![forbid(unsafe_code)]

//! Headless SVG renderers for figura diagram specifications.
//!
//! Each domain has one renderer taking its typed data and a [`RenderContext`]; the
//! [`dispatch`] module maps a validated [`figura_core::DiagramSpec`] onto the right one and turns
//! every failure into a visible placeholder.

pub mod apparatus;
pub mod capability;
pub mod cell;
pub mod circuit;
pub mod climate;
pub mod coordinate;
pub mod dispatch;
pub mod force;
pub mod function_graph;
pub mod generic;
pub mod geom;
pub mod geometry;
pub mod mapper;
pub mod molecule;
pub mod optics;
pub mod process_flow;
pub mod reaction;
pub mod svg;
pub mod text;

pub use capability::Collaborators;
pub use dispatch::{Rendered, render_spec, render_value};

use crate::mapper::Viewport;
use crate::svg::SvgDocument;
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use figura_core::{DomainTag, FiguraConfig, IdAllocator, SequentialIdAllocator};
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{diagram_type} diagram has nothing to draw: {message}")]
    MissingData {
        diagram_type: String,
        message: String,
    },
    #[error(transparent)]
    Spec(#[from] figura_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn missing(tag: DomainTag, message: impl Into<String>) -> Self {
        Self::MissingData {
            diagram_type: tag.as_str().to_string(),
            message: message.into(),
        }
    }
}

pub const DEFAULT_STROKE: &str = "#1f2937";
pub const DEFAULT_PALETTE: [&str; 6] = [
    "#2563eb", "#dc2626", "#16a34a", "#9333ea", "#ea580c", "#0891b2",
];
pub const DEFAULT_HIGHLIGHT_FILL: &str = "#fde68a";
pub const DEFAULT_HIGHLIGHT_STROKE: &str = "#d97706";
pub const MUTED: &str = "#6b7280";

/// Fixed canvas of one renderer, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Canvas {
    pub const fn new(width: f64, height: f64, padding: f64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height, self.padding)
    }
}

/// Built-in canvas of each domain. Reaction and flow heights are the one-band minimum; those
/// renderers grow with their content.
pub fn default_canvas(tag: DomainTag) -> Canvas {
    match tag {
        DomainTag::Geometry => Canvas::new(360.0, 280.0, 30.0),
        DomainTag::FunctionGraph => Canvas::new(400.0, 300.0, 40.0),
        DomainTag::CoordinateVector => Canvas::new(360.0, 300.0, 30.0),
        DomainTag::Force => Canvas::new(360.0, 260.0, 20.0),
        DomainTag::Circuit => Canvas::new(360.0, 240.0, 20.0),
        DomainTag::Optics => Canvas::new(420.0, 240.0, 30.0),
        DomainTag::Molecule => Canvas::new(360.0, 220.0, 20.0),
        DomainTag::Reaction => Canvas::new(420.0, 80.0, 10.0),
        DomainTag::Apparatus => Canvas::new(420.0, 200.0, 20.0),
        DomainTag::Cell => Canvas::new(360.0, 280.0, 20.0),
        DomainTag::ProcessFlow => Canvas::new(420.0, 130.0, 20.0),
        DomainTag::Climate => Canvas::new(420.0, 280.0, 40.0),
        DomainTag::Generic => Canvas::new(400.0, 300.0, 0.0),
    }
}

/// Typed render settings, resolved once per driver from a [`FiguraConfig`].
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub font_family: String,
    pub font_size: f64,
    pub sample_count: usize,
    pub stroke: String,
    pub palette: Vec<String>,
    pub highlight_fill: String,
    pub highlight_stroke: String,
    pub id_prefix: String,
    canvas_overrides: FxHashMap<DomainTag, Canvas>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 12.0,
            sample_count: 300,
            stroke: DEFAULT_STROKE.to_string(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            highlight_fill: DEFAULT_HIGHLIGHT_FILL.to_string(),
            highlight_stroke: DEFAULT_HIGHLIGHT_STROKE.to_string(),
            id_prefix: "figura".to_string(),
            canvas_overrides: FxHashMap::default(),
        }
    }
}

const ALL_TAGS: [DomainTag; 13] = [
    DomainTag::Geometry,
    DomainTag::FunctionGraph,
    DomainTag::CoordinateVector,
    DomainTag::Force,
    DomainTag::Circuit,
    DomainTag::Optics,
    DomainTag::Molecule,
    DomainTag::Reaction,
    DomainTag::Apparatus,
    DomainTag::Cell,
    DomainTag::ProcessFlow,
    DomainTag::Climate,
    DomainTag::Generic,
];

impl RenderSettings {
    pub fn from_config(config: &FiguraConfig) -> Self {
        let mut out = Self::default();
        if let Some(v) = config.get_str("fontFamily").filter(|s| !s.trim().is_empty()) {
            out.font_family = v.to_string();
        }
        if let Some(v) = config.get_f64("fontSize").filter(|v| *v > 0.0) {
            out.font_size = v;
        }
        if let Some(v) = config.get_f64("sampleCount").filter(|v| *v >= 2.0) {
            out.sample_count = (v as usize).min(10_000);
        }
        if let Some(v) = config.get_str("stroke") {
            out.stroke = v.to_string();
        }
        if let Some(v) = config.get_str("highlight.fill") {
            out.highlight_fill = v.to_string();
        }
        if let Some(v) = config.get_str("highlight.stroke") {
            out.highlight_stroke = v.to_string();
        }
        if let Some(v) = config.get_str("idPrefix").filter(|s| !s.trim().is_empty()) {
            out.id_prefix = v.trim().to_string();
        }
        if let Some(palette) = config
            .as_value()
            .get("palette")
            .and_then(|v| v.as_array())
        {
            let colors: Vec<String> = palette
                .iter()
                .filter_map(|c| c.as_str().map(str::to_string))
                .collect();
            if !colors.is_empty() {
                out.palette = colors;
            }
        }

        let global_padding = config.get_f64("padding").filter(|v| *v >= 0.0);
        for tag in ALL_TAGS {
            let base = default_canvas(tag);
            let key = tag.as_str();
            let width = config
                .get_f64(&format!("canvas.{key}.width"))
                .filter(|v| *v >= 1.0);
            let height = config
                .get_f64(&format!("canvas.{key}.height"))
                .filter(|v| *v >= 1.0);
            let padding = config
                .get_f64(&format!("canvas.{key}.padding"))
                .filter(|v| *v >= 0.0)
                .or(global_padding);
            if width.is_none() && height.is_none() && padding.is_none() {
                continue;
            }
            out.canvas_overrides.insert(
                tag,
                Canvas::new(
                    width.unwrap_or(base.width),
                    height.unwrap_or(base.height),
                    padding.unwrap_or(base.padding),
                ),
            );
        }
        out
    }

    pub fn canvas(&self, tag: DomainTag) -> Canvas {
        self.canvas_overrides
            .get(&tag)
            .copied()
            .unwrap_or_else(|| default_canvas(tag))
    }

    /// Palette color `i`, cycling.
    pub fn color(&self, i: usize) -> &str {
        if self.palette.is_empty() {
            return DEFAULT_PALETTE[i % DEFAULT_PALETTE.len()];
        }
        &self.palette[i % self.palette.len()]
    }
}

/// Everything a renderer may consult besides its data.
#[derive(Clone)]
pub struct RenderContext {
    pub settings: Arc<RenderSettings>,
    pub ids: Arc<dyn IdAllocator>,
    pub measurer: Arc<dyn TextMeasurer + Send + Sync>,
    pub collaborators: Collaborators,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("settings", &self.settings)
            .field("collaborators", &self.collaborators)
            .finish_non_exhaustive()
    }
}

impl RenderContext {
    pub fn new(settings: RenderSettings) -> Self {
        let ids = Arc::new(SequentialIdAllocator::new(settings.id_prefix.clone()));
        Self {
            settings: Arc::new(settings),
            ids,
            measurer: Arc::new(DeterministicTextMeasurer::default()),
            collaborators: Collaborators::default(),
        }
    }

    pub fn from_config(config: &FiguraConfig) -> Self {
        Self::new(RenderSettings::from_config(config))
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdAllocator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn next_id(&self) -> String {
        self.ids.next_id()
    }

    pub fn canvas(&self, tag: DomainTag) -> Canvas {
        self.settings.canvas(tag)
    }

    /// A fresh document for one diagram, with a unique id.
    pub fn document(&self, tag: DomainTag, width: f64, height: f64) -> SvgDocument {
        SvgDocument::new(self.next_id(), width, height)
            .with_class(format!("figura figura-{}", tag.as_str()))
            .with_font_family(self.settings.font_family.clone())
    }

    pub fn measure_width(&self, text: &str, font_size: f64) -> f64 {
        self.measurer
            .measure(text, &text::TextStyle::sized(font_size))
            .width
    }
}
