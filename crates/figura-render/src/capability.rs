//! Narrow interfaces to optional external renderers.
//!
//! Molecule drawing, flow layout and climate charting may be delegated to collaborators the host
//! provides. Every renderer that consults one keeps a primitive fallback, so an absent or failing
//! collaborator degrades the picture and never the batch.

use figura_core::models::climate::ClimateData;
use figura_core::models::process_flow::{FlowEdge, FlowNode};
use std::sync::Arc;

/// The drawing area a collaborator is asked to fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoleculeDrawing {
    /// A complete `<svg>` document.
    Svg(String),
    /// Encoded PNG bytes.
    Png(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct CollaboratorError {
    pub message: String,
    /// Text the collaborator suggests showing in place of its drawing.
    pub fallback_text: Option<String>,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fallback_text: None,
        }
    }

    pub fn with_fallback_text(mut self, text: impl Into<String>) -> Self {
        self.fallback_text = Some(text.into());
        self
    }
}

pub trait MoleculeDrawer: Send + Sync {
    fn present(&self) -> bool {
        true
    }

    fn render(
        &self,
        notation: &str,
        name: Option<&str>,
        surface: &Surface,
    ) -> Result<MoleculeDrawing, CollaboratorError>;
}

pub trait FlowLayoutEngine: Send + Sync {
    fn present(&self) -> bool {
        true
    }

    /// Returns the laid-out diagram as markup.
    fn render(
        &self,
        nodes: &[FlowNode],
        edges: &[FlowEdge],
        surface: &Surface,
    ) -> Result<String, CollaboratorError>;
}

pub trait ClimateCharting: Send + Sync {
    fn present(&self) -> bool {
        true
    }

    fn render(&self, series: &ClimateData, surface: &Surface) -> String;
}

#[derive(Clone, Default)]
pub struct Collaborators {
    pub molecule: Option<Arc<dyn MoleculeDrawer>>,
    pub flow: Option<Arc<dyn FlowLayoutEngine>>,
    pub climate: Option<Arc<dyn ClimateCharting>>,
}

impl Collaborators {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_molecule(mut self, drawer: Arc<dyn MoleculeDrawer>) -> Self {
        self.molecule = Some(drawer);
        self
    }

    pub fn with_flow(mut self, engine: Arc<dyn FlowLayoutEngine>) -> Self {
        self.flow = Some(engine);
        self
    }

    pub fn with_climate(mut self, charting: Arc<dyn ClimateCharting>) -> Self {
        self.climate = Some(charting);
        self
    }

    /// The molecule drawer, when one is installed and reports itself present.
    pub fn molecule(&self) -> Option<&dyn MoleculeDrawer> {
        self.molecule.as_deref().filter(|d| d.present())
    }

    pub fn flow(&self) -> Option<&dyn FlowLayoutEngine> {
        self.flow.as_deref().filter(|e| e.present())
    }

    pub fn climate(&self) -> Option<&dyn ClimateCharting> {
        self.climate.as_deref().filter(|c| c.present())
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("molecule", &self.molecule.is_some())
            .field("flow", &self.flow.is_some())
            .field("climate", &self.climate.is_some())
            .finish()
    }
}
