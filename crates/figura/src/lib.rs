#![forbid(unsafe_code)]

//! `figura` renders machine-generated educational diagram specifications into SVG, headless.
//!
//! A specification is a JSON object `{ type, title?, data }`. This crate ties the typed model in
//! `figura-core` to the renderers in `figura-render` and adds the batch driver that walks a set of
//! diagram containers (in memory, or embedded in an HTML host document) and renders each one
//! exactly once.
//!
//! # Features
//!
//! - `raster`: PNG/JPG output via pure-Rust SVG rasterization

pub use figura_core::*;

pub mod batch;

#[cfg(feature = "raster")]
pub mod raster;

pub mod render {
    pub use figura_render::capability::{
        ClimateCharting, CollaboratorError, Collaborators, FlowLayoutEngine, MoleculeDrawer,
        MoleculeDrawing, Surface,
    };
    pub use figura_render::svg::SvgDocument;
    pub use figura_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use figura_render::{RenderContext, RenderSettings, Rendered, render_spec, render_value};
}

pub use batch::{BatchDriver, BatchReport, Container, Document};
/// Spec and config errors from `figura-core`, renamed so they do not clash with [`Error`].
pub use figura_core::Error as SpecError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Invalid JSON5 input: {0}")]
    Json5(#[from] json5::Error),
    #[error("Failed to rewrite HTML document: {0}")]
    Html(#[from] lol_html::errors::RewritingError),
}

pub type Result<T> = std::result::Result<T, Error>;
