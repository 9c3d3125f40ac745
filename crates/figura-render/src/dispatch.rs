//! From a validated spec to one piece of markup.
//!
//! Rendering never fails from the caller's point of view: renderer errors and panics both come
//! back as [`Rendered::Placeholder`], so one broken diagram cannot take its siblings down.

use crate::svg::{SvgDocument, escape_xml};
use crate::{RenderContext, Result};
use figura_core::{DiagramSpec, DomainData};
use serde_json::Value;
use std::panic::{AssertUnwindSafe, catch_unwind};

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Svg(SvgDocument),
    /// Markup produced by a host collaborator, passed through untouched.
    Markup(String),
    /// Nothing drawable; a short text stands in for the picture.
    Description(String),
    /// A failed render, carrying the message shown to the reader.
    Placeholder(String),
}

impl Rendered {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn as_svg(&self) -> Option<&SvgDocument> {
        match self {
            Self::Svg(doc) => Some(doc),
            _ => None,
        }
    }

    /// The single child element to place inside a diagram container.
    pub fn to_markup(&self) -> String {
        match self {
            Self::Svg(doc) => doc.to_svg_string(),
            Self::Markup(markup) => markup.clone(),
            Self::Description(text) => description_markup(text),
            Self::Placeholder(message) => placeholder_markup(message),
        }
    }
}

pub fn placeholder_markup(message: &str) -> String {
    format!(
        r#"<div class="figura-error" role="note" style="border:1px dashed #dc2626;border-radius:4px;padding:8px 12px;color:#991b1b;background:#fef2f2;font:13px sans-serif">{}</div>"#,
        escape_xml(message)
    )
}

pub fn description_markup(text: &str) -> String {
    format!(
        r#"<div class="figura-description" style="border:1px solid #e5e7eb;border-radius:4px;padding:8px 12px;color:#374151;background:#f9fafb;font:13px sans-serif">{}</div>"#,
        escape_xml(text)
    )
}

/// Runs the renderer for `spec`'s domain; errors are returned, not converted.
pub fn try_render(spec: &DiagramSpec, ctx: &RenderContext) -> Result<Rendered> {
    let title = spec.title.as_deref();
    let svg = |doc: SvgDocument| Rendered::Svg(doc.with_title(title));
    let titled = |r: Rendered| match r {
        Rendered::Svg(doc) => svg(doc),
        other => other,
    };
    Ok(match &spec.data {
        DomainData::Geometry(d) => svg(crate::geometry::render_geometry(d, ctx)?),
        DomainData::FunctionGraph(d) => svg(crate::function_graph::render_function_graph(d, ctx)?),
        DomainData::CoordinateVector(d) => svg(crate::coordinate::render_coordinate(d, ctx)?),
        DomainData::Force(d) => svg(crate::force::render_force(d, ctx)?),
        DomainData::Circuit(d) => svg(crate::circuit::render_circuit(d, ctx)?),
        DomainData::Optics(d) => svg(crate::optics::render_optics(d, ctx)?),
        DomainData::Molecule(d) => titled(crate::molecule::render_molecule(d, ctx)?),
        DomainData::Reaction(d) => svg(crate::reaction::render_reaction(d, ctx)?),
        DomainData::Apparatus(d) => svg(crate::apparatus::render_apparatus(d, ctx)?),
        DomainData::Cell(d) => svg(crate::cell::render_cell(d, ctx)?),
        DomainData::ProcessFlow(d) => titled(crate::process_flow::render_flow(d, ctx)?),
        DomainData::Climate(d) => titled(crate::climate::render_climate(d, ctx)?),
        DomainData::Generic(d) => titled(crate::generic::render_generic(
            d,
            title,
            &spec.declared_type,
            ctx,
        )?),
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Renders one validated spec. Never fails: errors and panics become placeholders.
pub fn render_spec(spec: &DiagramSpec, ctx: &RenderContext) -> Rendered {
    let tag = spec.tag;
    match catch_unwind(AssertUnwindSafe(|| try_render(spec, ctx))) {
        Ok(Ok(rendered)) => rendered,
        Ok(Err(err)) => {
            tracing::warn!(diagram_type = %tag, error = %err, "render failed, placeholder emitted");
            Rendered::Placeholder(format!("Unable to render diagram: {err}"))
        }
        Err(payload) => {
            tracing::error!(
                diagram_type = %tag,
                panic = panic_message(payload.as_ref()),
                "renderer panicked, placeholder emitted"
            );
            Rendered::Placeholder(format!("Unable to render {tag} diagram: internal error"))
        }
    }
}

/// Validates a raw spec object, then renders it.
pub fn render_value(value: &Value, ctx: &RenderContext) -> Rendered {
    match DiagramSpec::from_value(value) {
        Ok(spec) => render_spec(&spec, ctx),
        Err(err) => {
            tracing::warn!(error = %err, "invalid diagram spec, placeholder emitted");
            Rendered::Placeholder(format!("Unable to render diagram: {err}"))
        }
    }
}
