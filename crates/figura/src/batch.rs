//! Batch rendering of diagram containers.
//!
//! A container holds one raw spec and a `rendered` flag. The driver walks containers in order,
//! renders every pending one exactly once and flips the flag, so re-running a batch over the same
//! containers (or the same HTML document) is a no-op.

use crate::{Error, Result};
use figura_core::FiguraConfig;
use figura_render::capability::Collaborators;
use figura_render::{RenderContext, Rendered, render_value};
use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use serde::Serialize;
use serde_json::Value;

/// Attribute holding the HTML-escaped JSON spec of an embedded diagram.
pub const SPEC_ATTR: &str = "data-diagram-spec";
/// Attribute set to `"true"` once a container has been rendered.
pub const RENDERED_ATTR: &str = "data-rendered";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub id: String,
    pub spec: Value,
    pub rendered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Container {
    pub fn new(id: impl Into<String>, spec: Value) -> Self {
        Self {
            id: id.into(),
            spec,
            rendered: false,
            output: None,
        }
    }

    fn from_item(index: usize, item: Value) -> Self {
        let default_id = format!("diagram-{}", index + 1);
        let Value::Object(mut obj) = item else {
            return Self::new(default_id, item);
        };
        if obj.contains_key("type") || !obj.contains_key("spec") {
            return Self::new(default_id, Value::Object(obj));
        }
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or(default_id);
        Self {
            id,
            spec: obj.remove("spec").unwrap_or(Value::Null),
            rendered: obj.get("rendered").and_then(Value::as_bool).unwrap_or(false),
            output: obj
                .get("output")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// An in-memory host document: containers in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub containers: Vec<Container>,
}

impl Document {
    /// Accepts an array of specs, an array of `{ id?, spec, rendered? }` wrappers,
    /// `{ "diagrams": [...] }`, or a single spec object.
    pub fn from_value(value: Value) -> Self {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut obj) if matches!(obj.get("diagrams"), Some(Value::Array(_))) => {
                match obj.remove("diagrams") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                }
            }
            other => vec![other],
        };
        Self {
            containers: items
                .into_iter()
                .enumerate()
                .map(|(i, item)| Container::from_item(i, item))
                .collect(),
        }
    }

    /// Parses strict JSON, falling back to JSON5 for hand-written input.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::from_value(parse_lenient(text)?))
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let out = if pretty {
            serde_json::to_string_pretty(&self.containers)?
        } else {
            serde_json::to_string(&self.containers)?
        };
        Ok(out)
    }

    pub fn pending(&self) -> usize {
        self.containers.iter().filter(|c| !c.rendered).count()
    }
}

pub(crate) fn parse_lenient(text: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::debug!(error = %err, "input is not strict JSON, retrying as JSON5");
            json5::from_str::<Value>(text).map_err(Error::from)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Containers that got a diagram (or a description for specs with nothing to draw).
    pub rendered: usize,
    /// Containers that got an error placeholder.
    pub failed: usize,
    /// Containers already marked rendered before this pass.
    pub skipped: usize,
}

impl BatchReport {
    fn record(&mut self, rendered: &Rendered) {
        if rendered.is_placeholder() {
            self.failed += 1;
        } else {
            self.rendered += 1;
        }
    }

    pub fn processed(&self) -> usize {
        self.rendered + self.failed
    }
}

/// Renders pending containers one at a time, in document order.
///
/// The driver owns one [`RenderContext`], and with it the session's id allocator: ids keep
/// increasing across every batch the driver runs.
#[derive(Debug, Clone, Default)]
pub struct BatchDriver {
    ctx: RenderContext,
}

impl BatchDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &FiguraConfig) -> Self {
        Self {
            ctx: RenderContext::from_config(config),
        }
    }

    pub fn with_context(ctx: RenderContext) -> Self {
        Self { ctx }
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.ctx = self.ctx.with_collaborators(collaborators);
        self
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    /// Renders one raw spec. Never fails; problems become placeholders.
    pub fn render_one(&self, spec: &Value) -> Rendered {
        render_value(spec, &self.ctx)
    }

    pub fn render_pending_sync(&self, containers: &mut [Container]) -> BatchReport {
        let mut report = BatchReport::default();
        for container in containers.iter_mut() {
            if container.rendered {
                tracing::debug!(id = %container.id, "container already rendered, skipped");
                report.skipped += 1;
                continue;
            }
            let rendered = self.render_one(&container.spec);
            report.record(&rendered);
            container.output = Some(rendered.to_markup());
            container.rendered = true;
        }
        report
    }

    pub async fn render_pending(&self, containers: &mut [Container]) -> BatchReport {
        self.render_pending_sync(containers)
    }

    pub fn render_document_sync(&self, document: &mut Document) -> BatchReport {
        self.render_pending_sync(&mut document.containers)
    }

    /// Rewrites an HTML host document: every element carrying [`SPEC_ATTR`] and not yet marked
    /// [`RENDERED_ATTR`] gets the rendered markup as its only child.
    pub fn render_html_sync(&self, html: &str) -> Result<(String, BatchReport)> {
        let mut report = BatchReport::default();
        let out = rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![element!("[data-diagram-spec]", |el| {
                    let done = el
                        .get_attribute(RENDERED_ATTR)
                        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
                    if done {
                        report.skipped += 1;
                        return Ok(());
                    }
                    let raw = el.get_attribute(SPEC_ATTR).unwrap_or_default();
                    let rendered = self.render_attribute(&raw);
                    report.record(&rendered);
                    el.set_inner_content(&rendered.to_markup(), ContentType::Html);
                    el.set_attribute(RENDERED_ATTR, "true")?;
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )?;
        Ok((out, report))
    }

    pub async fn render_html(&self, html: &str) -> Result<(String, BatchReport)> {
        self.render_html_sync(html)
    }

    fn render_attribute(&self, raw: &str) -> Rendered {
        let decoded = htmlize::unescape(raw);
        match parse_lenient(&decoded) {
            Ok(spec) => self.render_one(&spec),
            Err(err) => {
                tracing::warn!(error = %err, "embedded diagram spec is not JSON, placeholder emitted");
                Rendered::Placeholder(format!("Unable to render diagram: {err}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrappers_keep_their_ids_and_flags() {
        let doc = Document::from_value(json!([
            {"id": "fig-1", "spec": {"type": "cell"}},
            {"spec": {"type": "molecule"}, "rendered": true, "output": "<svg/>"},
            {"type": "reaction"}
        ]));
        let ids: Vec<&str> = doc.containers.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["fig-1", "diagram-2", "diagram-3"]);
        assert!(doc.containers[1].rendered);
        assert_eq!(doc.containers[1].output.as_deref(), Some("<svg/>"));
        assert_eq!(doc.containers[2].spec, json!({"type": "reaction"}));
        assert_eq!(doc.pending(), 2);
    }

    #[test]
    fn diagrams_key_and_single_spec_are_accepted() {
        let doc = Document::from_value(json!({"diagrams": [{"type": "a"}, {"type": "b"}]}));
        assert_eq!(doc.containers.len(), 2);
        let doc = Document::from_value(json!({"type": "cell", "data": {}}));
        assert_eq!(doc.containers.len(), 1);
    }

    #[test]
    fn json5_input_is_accepted() {
        let doc = Document::parse("[{type: 'reaction', data: {reactants: ['H2'],},},]").unwrap();
        assert_eq!(doc.containers.len(), 1);
        assert_eq!(doc.containers[0].spec["type"], json!("reaction"));
        assert!(matches!(Document::parse("[{"), Err(Error::Json5(_))));
    }

    #[test]
    fn report_counts_placeholders_as_failures() {
        let mut report = BatchReport::default();
        report.record(&Rendered::Placeholder("x".to_string()));
        report.record(&Rendered::Description("y".to_string()));
        assert_eq!(
            report,
            BatchReport {
                rendered: 1,
                failed: 1,
                skipped: 0
            }
        );
        assert_eq!(report.processed(), 2);
    }
}
