//! Climate charts: monthly precipitation bars with a temperature line.

use crate::capability::Surface;
use crate::dispatch::Rendered;
use crate::mapper::{nice_step, ticks};
use crate::svg::{Node, SvgDocument, fmt, fmt_into};
use crate::{Error, RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::climate::ClimateData;

const BAR_FILL: &str = "#60a5fa";
const LINE_COLOR: &str = "#dc2626";
/// Temperature axis margin above and below the data, in degrees.
pub const TEMPERATURE_MARGIN: f64 = 5.0;

/// `[0, max]` over the finite precipitation values; `[0, 1]` when there are none above zero.
pub fn precipitation_scale(values: &[f64]) -> (f64, f64) {
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    (0.0, if max > 0.0 { max } else { 1.0 })
}

/// `[min - 5, max + 5]` over the finite temperatures.
pub fn temperature_scale(values: &[f64]) -> Option<(f64, f64)> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    (lo <= hi).then_some((lo - TEMPERATURE_MARGIN, hi + TEMPERATURE_MARGIN))
}

pub fn render_climate(data: &ClimateData, ctx: &RenderContext) -> Result<Rendered> {
    if data.is_empty() {
        return Err(Error::missing(DomainTag::Climate, "no monthly series"));
    }
    let canvas = ctx.canvas(DomainTag::Climate);
    if let Some(charting) = ctx.collaborators.climate() {
        let surface = Surface {
            id: ctx.next_id(),
            width: canvas.width,
            height: canvas.height,
        };
        return Ok(Rendered::Markup(charting.render(data, &surface)));
    }
    Ok(Rendered::Svg(fallback_chart(data, ctx)))
}

fn fallback_chart(data: &ClimateData, ctx: &RenderContext) -> SvgDocument {
    let canvas = ctx.canvas(DomainTag::Climate);
    let stroke = ctx.settings.stroke.as_str();
    let small = (ctx.settings.font_size - 2.0).max(8.0);
    let mut doc = ctx.document(DomainTag::Climate, canvas.width, canvas.height);

    let plot = canvas.viewport().inner();
    let n = data.month_count();
    let band = plot.width() / n as f64;
    let center_x = |i: usize| plot.min_x() + band * (i as f64 + 0.5);

    let (p_lo, p_hi) = precipitation_scale(&data.precipitation);
    let p_map = |v: f64| plot.max_y() - (v - p_lo) / (p_hi - p_lo) * plot.height();
    let t_scale = temperature_scale(&data.temperature);

    if let Some(city) = data.city.as_deref().filter(|c| !c.trim().is_empty()) {
        doc.push(
            Node::text(canvas.width / 2.0, plot.min_y() - 16.0, city.trim())
                .class("climate-city")
                .anchor("middle")
                .attr("font-weight", "bold")
                .font_size(ctx.settings.font_size + 1.0)
                .fill(stroke),
        );
    }

    let mut bars = Node::group().class("precipitation");
    for (i, v) in data.precipitation.iter().take(n).enumerate() {
        if !v.is_finite() {
            continue;
        }
        let y = p_map(v.max(0.0));
        bars.push(
            Node::rect(center_x(i) - band * 0.3, y, band * 0.6, plot.max_y() - y)
                .fill(BAR_FILL)
                .attr("fill-opacity", "0.85"),
        );
    }
    doc.push(bars);

    let mut axes = Node::group().class("axes");
    axes.push(Node::line(plot.min_x(), plot.max_y(), plot.max_x(), plot.max_y()).stroke(stroke));
    axes.push(Node::line(plot.min_x(), plot.min_y(), plot.min_x(), plot.max_y()).stroke(BAR_FILL));
    for v in ticks(p_lo, p_hi, nice_step(p_hi - p_lo, 5.0), 20) {
        axes.push(
            Node::text(plot.min_x() - 4.0, p_map(v) + 3.0, fmt(v))
                .class("tick-label")
                .anchor("end")
                .font_size(small)
                .fill(BAR_FILL),
        );
    }
    axes.push(
        Node::text(plot.min_x(), plot.min_y() - 4.0, "mm")
            .anchor("end")
            .font_size(small)
            .fill(BAR_FILL),
    );
    for i in 0..n {
        axes.push(
            Node::text(center_x(i), plot.max_y() + 14.0, data.month_label(i))
                .class("month-label")
                .anchor("middle")
                .font_size(small)
                .fill(stroke),
        );
    }

    if let Some((t_lo, t_hi)) = t_scale {
        let t_map = |v: f64| plot.max_y() - (v - t_lo) / (t_hi - t_lo) * plot.height();
        axes.push(
            Node::line(plot.max_x(), plot.min_y(), plot.max_x(), plot.max_y()).stroke(LINE_COLOR),
        );
        for v in ticks(t_lo, t_hi, nice_step(t_hi - t_lo, 5.0), 20) {
            axes.push(
                Node::text(plot.max_x() + 4.0, t_map(v) + 3.0, fmt(v))
                    .class("tick-label")
                    .anchor("start")
                    .font_size(small)
                    .fill(LINE_COLOR),
            );
        }
        axes.push(
            Node::text(plot.max_x(), plot.min_y() - 4.0, "°C")
                .anchor("start")
                .font_size(small)
                .fill(LINE_COLOR),
        );
        doc.push(axes);

        let mut markers = Vec::new();
        let mut d = String::new();
        let mut pen_down = false;
        for (i, v) in data.temperature.iter().take(n).enumerate() {
            if !v.is_finite() {
                pen_down = false;
                continue;
            }
            let (x, y) = (center_x(i), t_map(*v));
            d.push(if pen_down { 'L' } else { 'M' });
            fmt_into(&mut d, x);
            d.push(' ');
            fmt_into(&mut d, y);
            pen_down = true;
            markers.push(Node::circle(x, y, 3.0).fill(LINE_COLOR));
        }
        doc.push(
            Node::group()
                .class("temperature")
                .child(
                    Node::path(d)
                        .fill("none")
                        .stroke(LINE_COLOR)
                        .stroke_width(2.0),
                )
                .children(markers),
        );
    } else {
        doc.push(axes);
    }

    doc
}
