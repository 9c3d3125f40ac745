//! Chemical equations, one band per reaction step.

use crate::svg::{Node, SvgDocument, fmt};
use crate::text::fit_font_size;
use crate::{Error, RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::reaction::{ReactionData, ReactionStep};

pub const BAND_HEIGHT: f64 = 60.0;
const TOP_MARGIN: f64 = 10.0;
const REACTANTS_END_X: f64 = 180.0;
const ARROW_START_X: f64 = 190.0;
const ARROW_END_X: f64 = 270.0;
const PRODUCTS_START_X: f64 = 280.0;
const SIDE_WIDTH: f64 = 170.0;
const MIN_FONT_SIZE: f64 = 9.0;

/// A formula split into plain and subscript runs. Digits directly after a letter or `)` are
/// subscripts; a leading coefficient stays plain.
pub fn formula_runs(formula: &str) -> Vec<(String, bool)> {
    let mut runs: Vec<(String, bool)> = Vec::new();
    let mut prev: Option<char> = None;
    for c in formula.chars() {
        let in_sub = runs.last().is_some_and(|r| r.1);
        let sub = c.is_ascii_digit()
            && prev.is_some_and(|p| {
                p.is_alphabetic() || p == ')' || (p.is_ascii_digit() && in_sub)
            });
        match runs.last_mut() {
            Some((text, is_sub)) if *is_sub == sub => text.push(c),
            _ => runs.push((c.to_string(), sub)),
        }
        prev = Some(c);
    }
    runs
}

fn formula_text(x: f64, y: f64, side: &[String], font_size: f64, fill: &str) -> Node {
    let mut text = Node::new("text")
        .num("x", x)
        .num("y", y)
        .font_size(font_size)
        .fill(fill);
    for (i, term) in side.iter().enumerate() {
        if i > 0 {
            text.push(Node::tspan(" + "));
        }
        for (run, sub) in formula_runs(term.trim()) {
            let mut span = Node::tspan(run);
            if sub {
                span = span
                    .attr("baseline-shift", "sub")
                    .font_size(font_size * 0.72);
            }
            text.push(span);
        }
    }
    text
}

fn joined(side: &[String]) -> String {
    side.iter()
        .map(|s| s.trim())
        .collect::<Vec<_>>()
        .join(" + ")
}

pub fn render_reaction(data: &ReactionData, ctx: &RenderContext) -> Result<SvgDocument> {
    let steps = data.effective_steps();
    if steps.is_empty() {
        return Err(Error::missing(DomainTag::Reaction, "no reaction steps"));
    }
    let canvas = ctx.canvas(DomainTag::Reaction);
    let height = canvas
        .height
        .max(TOP_MARGIN * 2.0 + BAND_HEIGHT * steps.len() as f64);
    let mut doc = ctx.document(DomainTag::Reaction, canvas.width, height);
    let products_width = SIDE_WIDTH.min(canvas.width - PRODUCTS_START_X - canvas.padding);

    for (i, step) in steps.iter().enumerate() {
        let cy = TOP_MARGIN + BAND_HEIGHT * i as f64 + BAND_HEIGHT / 2.0;
        doc.push(step_band(step, cy, products_width, ctx));
    }
    Ok(doc)
}

fn step_band(step: &ReactionStep, cy: f64, products_width: f64, ctx: &RenderContext) -> Node {
    let stroke = ctx.settings.stroke.as_str();
    let start = ctx.settings.font_size + 4.0;
    let measurer = ctx.measurer.as_ref();
    let mut band = Node::group().class("reaction-step");

    let left = joined(&step.reactants);
    let left_size = fit_font_size(measurer, &left, SIDE_WIDTH, start, MIN_FONT_SIZE);
    band.push(
        formula_text(REACTANTS_END_X, cy + 5.0, &step.reactants, left_size, stroke)
            .class("reactants")
            .anchor("end"),
    );

    let right = joined(&step.products);
    let right_size = fit_font_size(measurer, &right, products_width, start, MIN_FONT_SIZE);
    band.push(
        formula_text(PRODUCTS_START_X, cy + 5.0, &step.products, right_size, stroke)
            .class("products")
            .anchor("start"),
    );

    band.push(reaction_arrow(cy, step.reversible, stroke));

    let conditions: Vec<&str> = step
        .conditions
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if !conditions.is_empty() {
        let text = conditions.join(", ");
        let size = fit_font_size(
            measurer,
            &text,
            ARROW_END_X - ARROW_START_X + 20.0,
            ctx.settings.font_size - 1.0,
            7.0,
        );
        band.push(
            Node::text((ARROW_START_X + ARROW_END_X) / 2.0, cy - 9.0, text)
                .class("conditions")
                .anchor("middle")
                .font_size(size)
                .fill(crate::MUTED),
        );
    }
    band
}

fn reaction_arrow(cy: f64, reversible: bool, stroke: &str) -> Node {
    let head = 7.0;
    let d = if reversible {
        // Forward half-arrow above, backward half-arrow below.
        let (top, bottom) = (cy - 3.0, cy + 3.0);
        format!(
            "M{x0} {top} L{x1} {top} L{hx1} {ht} M{x1} {bottom} L{x0} {bottom} L{hx0} {hb}",
            x0 = fmt(ARROW_START_X),
            x1 = fmt(ARROW_END_X),
            top = fmt(top),
            bottom = fmt(bottom),
            hx1 = fmt(ARROW_END_X - head),
            hx0 = fmt(ARROW_START_X + head),
            ht = fmt(top - head * 0.6),
            hb = fmt(bottom + head * 0.6),
        )
    } else {
        format!(
            "M{x0} {y} L{x1} {y} M{hx} {ya} L{x1} {y} L{hx} {yb}",
            x0 = fmt(ARROW_START_X),
            x1 = fmt(ARROW_END_X),
            y = fmt(cy),
            hx = fmt(ARROW_END_X - head),
            ya = fmt(cy - head * 0.6),
            yb = fmt(cy + head * 0.6),
        )
    };
    Node::path(d)
        .class(if reversible {
            "reaction-arrow reversible"
        } else {
            "reaction-arrow"
        })
        .fill("none")
        .stroke(stroke)
        .stroke_width(1.5)
}
