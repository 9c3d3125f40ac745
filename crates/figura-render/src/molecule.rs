//! Molecule structures: a host drawer when one is installed, else a zig-zag skeleton of the
//! SMILES main chain.

use crate::capability::{MoleculeDrawing, Surface};
use crate::dispatch::Rendered;
use crate::geom::{point, unit, vector};
use crate::svg::{Node, SvgDocument, escape_xml};
use crate::{Error, RenderContext, Result};
use base64::Engine as _;
use figura_core::DomainTag;
use figura_core::models::molecule::MoleculeData;
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_CHAIN_ATOMS: usize = 14;
const MAX_CAPTION_CHARS: usize = 48;

#[derive(Debug, Clone, PartialEq)]
pub struct ChainAtom {
    pub symbol: String,
    /// Order of the bond to the previous atom (1 for the first atom).
    pub bond: u8,
}

const SMILES_TOKEN: &str = r"\[[^\]]*\]|Cl|Br|[BCNOPSFI]|[bcnops]|[=#$]|%\d\d|\d|[()\-/\\.+@]";

fn smiles_token_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SMILES_TOKEN).ok()).as_ref()
}

/// Atoms of the flattened main chain: branch parentheses and ring digits are ignored, bond
/// symbols set the order of the next bond.
pub fn main_chain(smiles: &str) -> Vec<ChainAtom> {
    let mut out = Vec::new();
    let Some(re) = smiles_token_re() else {
        tracing::warn!("molecule: SMILES tokenizer unavailable");
        return out;
    };
    let mut pending = 1u8;
    for m in re.find_iter(smiles) {
        let tok = m.as_str();
        match tok {
            "=" => pending = 2,
            "#" | "$" => pending = 3,
            "." => pending = 1,
            "(" | ")" | "-" | "/" | "\\" | "+" | "@" => {}
            t if t.starts_with('%') || t.chars().all(|c| c.is_ascii_digit()) => {}
            t => {
                let symbol = bracket_symbol(t);
                let bond = if out.is_empty() { 1 } else { pending };
                out.push(ChainAtom { symbol, bond });
                pending = 1;
                if out.len() == MAX_CHAIN_ATOMS {
                    break;
                }
            }
        }
    }
    out
}

/// `[NH4+]` -> `NH4+`, `c` -> `C`.
fn bracket_symbol(tok: &str) -> String {
    let inner = tok.trim_start_matches('[').trim_end_matches(']');
    let mut chars = inner.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => "?".to_string(),
    }
}

fn is_carbon(symbol: &str) -> bool {
    symbol == "C"
}

pub fn render_molecule(data: &MoleculeData, ctx: &RenderContext) -> Result<Rendered> {
    let Some(notation) = data.notation() else {
        return Err(Error::missing(DomainTag::Molecule, "empty structure notation"));
    };
    let canvas = ctx.canvas(DomainTag::Molecule);
    let name = data.name.as_deref().filter(|n| !n.trim().is_empty());

    let mut note = None;
    if let Some(drawer) = ctx.collaborators.molecule() {
        let surface = Surface {
            id: ctx.next_id(),
            width: canvas.width,
            height: canvas.height,
        };
        match drawer.render(notation, name, &surface) {
            Ok(MoleculeDrawing::Svg(svg)) => return Ok(Rendered::Markup(svg)),
            Ok(MoleculeDrawing::Png(bytes)) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                return Ok(Rendered::Markup(format!(
                    r#"<img class="figura figura-molecule" alt="{alt}" width="{w}" height="{h}" src="data:image/png;base64,{encoded}"/>"#,
                    alt = escape_xml(name.unwrap_or(notation)),
                    w = crate::svg::fmt(surface.width),
                    h = crate::svg::fmt(surface.height),
                )));
            }
            Err(err) => {
                tracing::debug!(notation, error = %err, "molecule: drawer failed, using skeleton");
                note = err.fallback_text;
            }
        }
    }

    Ok(Rendered::Svg(skeleton(notation, name, note.as_deref(), ctx)))
}

fn skeleton(
    notation: &str,
    name: Option<&str>,
    note: Option<&str>,
    ctx: &RenderContext,
) -> SvgDocument {
    let canvas = ctx.canvas(DomainTag::Molecule);
    let stroke = ctx.settings.stroke.as_str();
    let mut doc = ctx.document(DomainTag::Molecule, canvas.width, canvas.height);

    let atoms = main_chain(notation);
    let mid_y = canvas.height * 0.4;
    let step = if atoms.len() > 1 {
        (36.0_f64).min((canvas.width - 2.0 * canvas.padding - 20.0) / (atoms.len() - 1) as f64)
    } else {
        0.0
    };
    let chain_w = step * atoms.len().saturating_sub(1) as f64;
    let x0 = (canvas.width - chain_w) / 2.0;
    let at = |i: usize| {
        let dy = if i % 2 == 0 { 12.0 } else { -12.0 };
        point(x0 + step * i as f64, mid_y + dy)
    };

    let mut bonds = Node::group().class("bonds");
    for (i, atom) in atoms.iter().enumerate().skip(1) {
        let (a, b) = (at(i - 1), at(i));
        let offsets: &[f64] = match atom.bond {
            2 => &[-2.5, 2.5],
            3 => &[-3.5, 0.0, 3.5],
            _ => &[0.0],
        };
        let dir = unit(b - a).unwrap_or(vector(1.0, 0.0));
        let normal = vector(-dir.y, dir.x);
        for off in offsets {
            let (p, q) = (a + normal * *off, b + normal * *off);
            bonds.push(Node::line(p.x, p.y, q.x, q.y).stroke(stroke).stroke_width(1.6));
        }
    }
    doc.push(bonds);

    let mut labels = Node::group().class("atoms");
    for (i, atom) in atoms.iter().enumerate() {
        if is_carbon(&atom.symbol) && atoms.len() > 1 {
            continue;
        }
        let p = at(i);
        let color = match atom.symbol.as_str() {
            "O" => ctx.settings.color(1),
            "N" => ctx.settings.color(0),
            "S" => "#ca8a04",
            _ => stroke,
        };
        labels.push(Node::circle(p.x, p.y, 8.0).fill("#ffffff"));
        labels.push(
            Node::text(p.x, p.y, atom.symbol.as_str())
                .class("atom")
                .anchor("middle")
                .baseline("central")
                .font_size(ctx.settings.font_size + 1.0)
                .attr("font-weight", "bold")
                .fill(color),
        );
    }
    doc.push(labels);

    let mut captions = Node::group().class("molecule-caption");
    let mut y = mid_y + 48.0;
    if let Some(name) = name {
        captions.push(
            Node::text(canvas.width / 2.0, y, name)
                .class("molecule-name")
                .anchor("middle")
                .font_size(ctx.settings.font_size + 2.0)
                .attr("font-weight", "bold")
                .fill(stroke),
        );
        y += 20.0;
    }
    if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
        captions.push(
            Node::text(canvas.width / 2.0, y, note)
                .class("molecule-note")
                .anchor("middle")
                .font_size(ctx.settings.font_size - 1.0)
                .fill(crate::MUTED),
        );
    }
    let shown: String = if notation.chars().count() > MAX_CAPTION_CHARS {
        notation.chars().take(MAX_CAPTION_CHARS - 1).chain(['…']).collect()
    } else {
        notation.to_string()
    };
    captions.push(
        Node::text(canvas.width / 2.0, canvas.height - 14.0, shown)
            .class("molecule-notation")
            .anchor("middle")
            .attr("font-family", "monospace")
            .font_size(ctx.settings.font_size - 1.0)
            .fill(crate::MUTED),
    );
    doc.push(captions);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_flattens_branches_and_skips_ring_digits() {
        let atoms = main_chain("CC(=O)O");
        let symbols: Vec<&str> = atoms.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "C", "O", "O"]);
        assert_eq!(atoms[2].bond, 2);
        assert_eq!(atoms[3].bond, 1);

        let ring = main_chain("c1ccccc1");
        assert_eq!(ring.len(), 6);
        assert!(ring.iter().all(|a| a.symbol == "C"));
    }

    #[test]
    fn chain_reads_two_letter_and_bracket_atoms() {
        let atoms = main_chain("ClC#N[NH4+]");
        let symbols: Vec<&str> = atoms.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Cl", "C", "N", "NH4+"]);
        assert_eq!(atoms[2].bond, 3);
    }

    #[test]
    fn tokenizer_pattern_compiles() {
        assert!(smiles_token_re().is_some());
    }

    #[test]
    fn chain_is_capped() {
        let atoms = main_chain(&"C".repeat(40));
        assert_eq!(atoms.len(), MAX_CHAIN_ATOMS);
    }
}
