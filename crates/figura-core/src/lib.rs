#![forbid(unsafe_code)]

//! Diagram specification model for figura (headless).
//!
//! A diagram specification is a machine-generated JSON object `{ type, title?, data }` describing
//! a mathematical, physical, chemical, biological or geographic figure. This crate owns:
//! - the typed model of every supported domain ([`spec::DomainData`]) and its boundary validation
//! - the restricted expression evaluator used to plot user supplied functions ([`expr`])
//! - the session id allocator ([`ids`]) and the JSON/YAML configuration layer ([`config`])
//!
//! Rendering lives in `figura-render`; batch processing of host documents lives in `figura`.

pub mod config;
pub mod error;
pub mod expr;
pub mod ids;
pub mod models;
pub mod spec;

pub use config::FiguraConfig;
pub use error::{Error, Result};
pub use expr::{CompiledExpr, ExprError, evaluate};
pub use ids::{IdAllocator, SequentialIdAllocator};
pub use spec::{DiagramSpec, DomainData, DomainTag};

#[cfg(test)]
mod tests;
