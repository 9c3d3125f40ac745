//! Function plots: sampled curves, grid, axes, marked points and asymptotes.

use crate::geom::Rect;
use crate::mapper::{Bounds, CoordinateMapper, nice_step, ticks};
use crate::svg::{Node, SvgDocument, fmt, fmt_into};
use crate::{RenderContext, Result};
use figura_core::expr::CompiledExpr;
use figura_core::models::function_graph::FunctionGraphData;
use figura_core::DomainTag;

pub const DEFAULT_X_RANGE: [f64; 2] = [-10.0, 10.0];
/// Samples further than this fraction of the y span outside the range break the path.
pub const BREAK_MARGIN: f64 = 0.1;
/// Neighbouring samples further apart than this fraction of the y span break the path.
pub const JUMP_FRACTION: f64 = 0.5;
const MAX_GRID_LINES: usize = 100;
const GRID_COLOR: &str = "#e5e7eb";

/// One sampled curve, split into drawable runs of at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledCurve {
    pub runs: Vec<Vec<(f64, f64)>>,
}

/// Samples `f` at `n` evenly spaced x values including both ends of `[x0, x1]`.
pub fn sample(f: &CompiledExpr, x0: f64, x1: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let x = x0 + (x1 - x0) * (i as f64) / ((n - 1) as f64);
            (x, f.eval(x))
        })
        .collect()
}

/// Splits samples into runs: non-finite values and values beyond the break margin end a run,
/// values inside the margin are clamped onto the range. A jump between neighbours larger than
/// [`JUMP_FRACTION`] of the span starts a new run.
pub fn split_runs(samples: &[(f64, f64)], y_lo: f64, y_hi: f64) -> SampledCurve {
    let span = y_hi - y_lo;
    let margin = span * BREAK_MARGIN;
    let mut runs = Vec::new();
    let mut cur: Vec<(f64, f64)> = Vec::new();
    let mut prev: Option<f64> = None;
    for &(x, y) in samples {
        let visible = y.is_finite() && y >= y_lo - margin && y <= y_hi + margin;
        let jumped = prev.is_some_and(|p| (y - p).abs() > span * JUMP_FRACTION);
        if !visible || jumped {
            if cur.len() >= 2 {
                runs.push(std::mem::take(&mut cur));
            } else {
                cur.clear();
            }
        }
        if visible {
            cur.push((x, y.clamp(y_lo, y_hi)));
            prev = Some(y);
        } else {
            prev = None;
        }
    }
    if cur.len() >= 2 {
        runs.push(cur);
    }
    SampledCurve { runs }
}

/// Value at fraction `q` of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// The y extent of the finite samples, ignoring outliers beyond a fence one 5-95 percentile
/// spread wide on each side, padded by 10%. `None` when nothing is finite.
pub fn auto_y_range<'a>(samples: impl IntoIterator<Item = &'a (f64, f64)>) -> Option<[f64; 2]> {
    let mut ys: Vec<f64> = samples
        .into_iter()
        .map(|&(_, y)| y)
        .filter(|y| y.is_finite())
        .collect();
    if ys.is_empty() {
        return None;
    }
    ys.sort_by(f64::total_cmp);
    let (q_lo, q_hi) = (quantile(&ys, 0.05), quantile(&ys, 0.95));
    let spread = q_hi - q_lo;
    let (fence_lo, fence_hi) = (q_lo - spread, q_hi + spread);
    let mut kept = ys.iter().copied().filter(|y| (fence_lo..=fence_hi).contains(y));
    let first = kept.next()?;
    let (lo, hi) = kept.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let pad = (hi - lo) * 0.1;
    Some([lo - pad, hi + pad])
}

fn grid_step(requested: Option<f64>, span: f64) -> f64 {
    match requested {
        Some(step) if step.is_finite() && step > 0.0 && span / step <= MAX_GRID_LINES as f64 => {
            step
        }
        _ => nice_step(span, 10.0),
    }
}

pub fn render_function_graph(data: &FunctionGraphData, ctx: &RenderContext) -> Result<SvgDocument> {
    let canvas = ctx.canvas(DomainTag::FunctionGraph);
    let x_range = data.x_range.unwrap_or(DEFAULT_X_RANGE);
    let x_axis = Bounds::new(x_range[0], x_range[1], 0.0, 1.0).normalized();
    let (x0, x1) = (x_axis.min_x, x_axis.max_x);

    let curves: Vec<_> = data
        .functions
        .iter()
        .enumerate()
        .filter_map(|(i, curve)| match CompiledExpr::compile(&curve.expr) {
            Ok(compiled) => Some((i, curve, compiled)),
            Err(err) => {
                tracing::debug!(expr = %curve.expr, error = %err, "function graph: curve skipped");
                None
            }
        })
        .collect();
    let samples: Vec<Vec<(f64, f64)>> = curves
        .iter()
        .map(|(_, _, f)| sample(f, x0, x1, ctx.settings.sample_count))
        .collect();

    let y_range = data
        .y_range
        .or_else(|| auto_y_range(samples.iter().flatten()));
    let bounds = match y_range {
        Some(y) => Bounds::new(x0, x1, y[0], y[1]),
        None => Bounds::from_ranges(Some([x0, x1]), None),
    }
    .normalized();
    let mapper = CoordinateMapper::stretch(bounds, canvas.viewport());
    let plot = mapper.plot_rect();

    let mut doc = ctx.document(DomainTag::FunctionGraph, canvas.width, canvas.height);
    let clip_id = format!("{}-clip", ctx.next_id());
    doc.push_def(Node::clip_path(
        clip_id.clone(),
        Node::rect(plot.min_x(), plot.min_y(), plot.width(), plot.height()),
    ));

    draw_grid_and_axes(&mut doc, data, &mapper, &plot, ctx);

    let mut asymptotes = Node::group()
        .class("asymptotes")
        .attr("clip-path", format!("url(#{clip_id})"));
    for x in data.all_vertical_asymptotes().filter(|x| bounds.contains_x(*x)) {
        let px = mapper.map_x(x);
        asymptotes.push(
            Node::line(px, plot.min_y(), px, plot.max_y())
                .stroke(crate::MUTED)
                .dashed("6 4"),
        );
    }
    for y in data.all_horizontal_asymptotes().filter(|y| bounds.contains_y(*y)) {
        let py = mapper.map_y(y);
        asymptotes.push(
            Node::line(plot.min_x(), py, plot.max_x(), py)
                .stroke(crate::MUTED)
                .dashed("6 4"),
        );
    }
    doc.push(asymptotes);

    let mut curve_group = Node::group()
        .class("curves")
        .attr("clip-path", format!("url(#{clip_id})"));
    let mut curve_labels = Node::group().class("curve-labels");
    for ((i, curve, _), samples) in curves.iter().zip(&samples) {
        let color = curve
            .color
            .clone()
            .unwrap_or_else(|| ctx.settings.color(*i).to_string());
        let sampled = split_runs(samples, bounds.min_y, bounds.max_y);
        if sampled.runs.is_empty() {
            tracing::debug!(expr = %curve.expr, "function graph: no visible samples");
            continue;
        }
        let mut d = String::new();
        for run in &sampled.runs {
            for (k, (x, y)) in run.iter().enumerate() {
                d.push(if k == 0 { 'M' } else { 'L' });
                fmt_into(&mut d, mapper.map_x(*x));
                d.push(' ');
                fmt_into(&mut d, mapper.map_y(*y));
            }
        }
        let mut path = Node::path(d)
            .class("curve")
            .fill("none")
            .stroke(color.as_str())
            .stroke_width(2.0);
        if curve.is_dashed() {
            path = path.dashed("6 4");
        }
        curve_group.push(path);

        if let Some(label) = curve.label.as_deref().filter(|l| !l.is_empty()) {
            let last = sampled
                .runs
                .last()
                .and_then(|run| run.last())
                .map(|(x, y)| mapper.map(*x, *y));
            if let Some(at) = last {
                curve_labels.push(
                    Node::text(at.x - 4.0, (at.y - 6.0).max(plot.min_y() + 10.0), label)
                        .class("curve-label")
                        .anchor("end")
                        .font_size(ctx.settings.font_size)
                        .fill(color.as_str()),
                );
            }
        }
    }
    doc.push(curve_group);
    doc.push(curve_labels);

    let mut points = Node::group().class("points");
    for (i, p) in data.points.iter().enumerate() {
        if !(p.x.is_finite() && p.y.is_finite()) || !bounds.contains(p.x, p.y) {
            continue;
        }
        let at = mapper.map(p.x, p.y);
        let color = p
            .color
            .clone()
            .unwrap_or_else(|| ctx.settings.color(i + 1).to_string());
        points.push(Node::circle(at.x, at.y, 4.0).fill(color.as_str()));
        if let Some(label) = p.label.as_deref().filter(|l| !l.is_empty()) {
            points.push(
                Node::text(at.x + 6.0, at.y - 6.0, label)
                    .class("point-label")
                    .font_size(ctx.settings.font_size)
                    .fill(ctx.settings.stroke.as_str()),
            );
        }
    }
    doc.push(points);

    Ok(doc)
}

fn draw_grid_and_axes(
    doc: &mut SvgDocument,
    data: &FunctionGraphData,
    mapper: &CoordinateMapper,
    plot: &Rect,
    ctx: &RenderContext,
) {
    let bounds = mapper.bounds();
    let x_step = grid_step(data.grid_step, bounds.width());
    let y_step = grid_step(data.grid_step, bounds.height());
    let xs = ticks(bounds.min_x, bounds.max_x, x_step, MAX_GRID_LINES);
    let ys = ticks(bounds.min_y, bounds.max_y, y_step, MAX_GRID_LINES);

    let mut grid = Node::group().class("grid");
    for &x in &xs {
        let px = mapper.map_x(x);
        grid.push(Node::line(px, plot.min_y(), px, plot.max_y()).stroke(GRID_COLOR));
    }
    for &y in &ys {
        let py = mapper.map_y(y);
        grid.push(Node::line(plot.min_x(), py, plot.max_x(), py).stroke(GRID_COLOR));
    }
    doc.push(grid);

    let stroke = ctx.settings.stroke.as_str();
    let axis_y = if bounds.contains_y(0.0) {
        mapper.map_y(0.0)
    } else {
        plot.max_y()
    };
    let axis_x = if bounds.contains_x(0.0) {
        mapper.map_x(0.0)
    } else {
        plot.min_x()
    };
    let font_size = (ctx.settings.font_size - 2.0).max(8.0);

    let mut axes = Node::group().class("axes");
    axes.push(
        Node::line(plot.min_x(), axis_y, plot.max_x(), axis_y)
            .stroke(stroke)
            .stroke_width(1.5),
    );
    axes.push(
        Node::line(axis_x, plot.min_y(), axis_x, plot.max_y())
            .stroke(stroke)
            .stroke_width(1.5),
    );
    for &x in &xs {
        if x == 0.0 && bounds.contains_x(0.0) && bounds.contains_y(0.0) {
            continue;
        }
        axes.push(
            Node::text(mapper.map_x(x), axis_y + 14.0, fmt(x))
                .class("tick-label")
                .anchor("middle")
                .font_size(font_size)
                .fill(crate::MUTED),
        );
    }
    for &y in &ys {
        if y == 0.0 && bounds.contains_x(0.0) && bounds.contains_y(0.0) {
            continue;
        }
        axes.push(
            Node::text(axis_x - 5.0, mapper.map_y(y) + 4.0, fmt(y))
                .class("tick-label")
                .anchor("end")
                .font_size(font_size)
                .fill(crate::MUTED),
        );
    }
    if bounds.contains_x(0.0) && bounds.contains_y(0.0) {
        axes.push(
            Node::text(axis_x - 5.0, axis_y + 14.0, "0")
                .class("tick-label")
                .anchor("end")
                .font_size(font_size)
                .fill(crate::MUTED),
        );
    }
    doc.push(axes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(src: &str, x0: f64, x1: f64) -> Vec<(f64, f64)> {
        sample(&CompiledExpr::compile(src).unwrap(), x0, x1, 300)
    }

    #[test]
    fn auto_range_ignores_poles() {
        let [lo, hi] = auto_y_range(&curve("1/x", -4.0, 4.0)).unwrap();
        assert!(lo > -20.0 && hi < 20.0, "[{lo}, {hi}]");
        assert!(lo < -2.0 && hi > 2.0, "[{lo}, {hi}]");
    }

    #[test]
    fn auto_range_keeps_smooth_extremes() {
        let [lo, hi] = auto_y_range(&curve("x^2", -10.0, 10.0)).unwrap();
        assert!(lo <= 0.0 && hi >= 100.0, "[{lo}, {hi}]");
        assert_eq!(auto_y_range(&curve("ln(x)", -5.0, -1.0)), None);
    }

    #[test]
    fn jumps_inside_the_range_break_the_path() {
        let samples = [(0.0, -4.0), (1.0, -4.5), (2.0, 4.5), (3.0, 4.0)];
        let runs = split_runs(&samples, -5.0, 5.0).runs;
        assert_eq!(runs.len(), 2);

        let smooth = [(0.0, -1.0), (1.0, 0.0), (2.0, 1.0)];
        assert_eq!(split_runs(&smooth, -5.0, 5.0).runs.len(), 1);
    }
}
