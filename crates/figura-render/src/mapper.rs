//! Semantic coordinates to canvas pixels.
//!
//! A mapper is computed once per render from a semantic bounding box and a viewport. Degenerate
//! inputs never reach a division: every axis is normalized to a positive span first.

use crate::geom::{Point, Rect, point, rect};
use figura_core::models::AxisRange;

pub const DEFAULT_SPAN_X: f64 = 4.0;
pub const DEFAULT_SPAN_Y: f64 = 3.0;
const MIN_SPAN: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            max_x: DEFAULT_SPAN_X,
            min_y: 0.0,
            max_y: DEFAULT_SPAN_Y,
        }
    }
}

impl Bounds {
    /// Raw bounds; call [`Bounds::normalized`] before mapping.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Bounds from optional `[low, high]` ranges, already normalized.
    pub fn from_ranges(x: Option<AxisRange>, y: Option<AxisRange>) -> Self {
        let (min_x, max_x) = normalize_axis(x.map(|r| (r[0], r[1])), DEFAULT_SPAN_X);
        let (min_y, max_y) = normalize_axis(y.map(|r| (r[0], r[1])), DEFAULT_SPAN_Y);
        Self::new(min_x, max_x, min_y, max_y)
    }

    /// Tight bounds of the finite points, or `None` when there are none.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut out: Option<Self> = None;
        for (x, y) in points {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            match out.as_mut() {
                Some(b) => b.include(x, y),
                None => out = Some(Self::new(x, x, y, y)),
            }
        }
        out
    }

    pub fn include(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Every axis finite, ordered and with a positive span.
    pub fn normalized(self) -> Self {
        let (min_x, max_x) = normalize_axis(Some((self.min_x, self.max_x)), DEFAULT_SPAN_X);
        let (min_y, max_y) = normalize_axis(Some((self.min_y, self.max_y)), DEFAULT_SPAN_Y);
        Self::new(min_x, max_x, min_y, max_y)
    }

    /// Grows each side by `frac` of the span on that axis.
    pub fn expanded(self, frac: f64) -> Self {
        let b = self.normalized();
        let (dx, dy) = (b.width() * frac, b.height() * frac);
        Self::new(b.min_x - dx, b.max_x + dx, b.min_y - dy, b.max_y + dy)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.min_y && y <= self.max_y
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.contains_x(x) && self.contains_y(y)
    }
}

fn normalize_axis(range: Option<(f64, f64)>, default_span: f64) -> (f64, f64) {
    let Some((a, b)) = range else {
        return (0.0, default_span);
    };
    let (lo, hi) = match (a.is_finite(), b.is_finite()) {
        (true, true) => (a.min(b), a.max(b)),
        (true, false) => (a, a),
        (false, true) => (b, b),
        (false, false) => return (0.0, default_span),
    };
    if hi - lo < MIN_SPAN {
        let half = default_span / 2.0;
        return (lo - half, lo + half);
    }
    (lo, hi)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, padding: f64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    /// The padded drawing area; never narrower than one pixel.
    pub fn inner(&self) -> Rect {
        let pad = self.padding.max(0.0);
        rect(
            pad,
            pad,
            (self.width - 2.0 * pad).max(1.0),
            (self.height - 2.0 * pad).max(1.0),
        )
    }
}

/// Affine map from semantic coordinates to pixels with Y flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    bounds: Bounds,
    scale_x: f64,
    scale_y: f64,
    origin_x: f64,
    origin_y: f64,
}

impl CoordinateMapper {
    /// Uniform scale, content centered inside the padded viewport.
    pub fn fit(bounds: Bounds, viewport: Viewport) -> Self {
        let bounds = bounds.normalized();
        let inner = viewport.inner();
        let scale = (inner.width() / bounds.width()).min(inner.height() / bounds.height());
        let used_w = bounds.width() * scale;
        let used_h = bounds.height() * scale;
        Self {
            bounds,
            scale_x: scale,
            scale_y: scale,
            origin_x: inner.min_x() + (inner.width() - used_w) / 2.0,
            origin_y: inner.min_y() + (inner.height() - used_h) / 2.0,
        }
    }

    /// Independent x/y scales filling the whole padded viewport.
    pub fn stretch(bounds: Bounds, viewport: Viewport) -> Self {
        let bounds = bounds.normalized();
        let inner = viewport.inner();
        Self {
            bounds,
            scale_x: inner.width() / bounds.width(),
            scale_y: inner.height() / bounds.height(),
            origin_x: inner.min_x(),
            origin_y: inner.min_y(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn map_x(&self, x: f64) -> f64 {
        self.origin_x + (x - self.bounds.min_x) * self.scale_x
    }

    pub fn map_y(&self, y: f64) -> f64 {
        self.origin_y + (self.bounds.max_y - y) * self.scale_y
    }

    pub fn map(&self, x: f64, y: f64) -> Point {
        point(self.map_x(x), self.map_y(y))
    }

    /// The uniform scale factor (the smaller one for stretched mappers).
    pub fn scale(&self) -> f64 {
        self.scale_x.min(self.scale_y)
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Pixel rectangle covered by the semantic bounds.
    pub fn plot_rect(&self) -> Rect {
        rect(
            self.origin_x,
            self.origin_y,
            self.bounds.width() * self.scale_x,
            self.bounds.height() * self.scale_y,
        )
    }
}

/// Liang-Barsky clipping of `p0 -> p1` against `clip`. `None` when nothing is visible.
pub fn clip_segment(p0: Point, p1: Point, clip: &Rect) -> Option<(Point, Point)> {
    let (dx, dy) = (p1.x - p0.x, p1.y - p0.y);
    let checks = [
        (-dx, p0.x - clip.min_x()),
        (dx, clip.max_x() - p0.x),
        (-dy, p0.y - clip.min_y()),
        (dy, clip.max_y() - p0.y),
    ];
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in checks {
        if p.abs() < 1e-12 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((
        point(p0.x + t0 * dx, p0.y + t0 * dy),
        point(p0.x + t1 * dx, p0.y + t1 * dy),
    ))
}

/// A 1-2-5 step giving roughly `target` divisions over `span`.
pub fn nice_step(span: f64, target: f64) -> f64 {
    if !(span.is_finite() && span > 0.0) || target <= 0.0 {
        return 1.0;
    }
    let raw = span / target;
    let magnitude = 10f64.powf(raw.log10().floor());
    let norm = raw / magnitude;
    let nice = if norm < 1.5 {
        1.0
    } else if norm < 3.5 {
        2.0
    } else if norm < 7.5 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Multiples of `step` inside `[lo, hi]`, at most `max` of them.
pub fn ticks(lo: f64, hi: f64, step: f64, max: usize) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0) || !(lo.is_finite() && hi.is_finite()) {
        return Vec::new();
    }
    let first = (lo / step).ceil();
    let mut out = Vec::new();
    let mut k = first;
    loop {
        let v = k * step;
        if v > hi + step * 1e-9 || out.len() >= max {
            break;
        }
        out.push(if v.abs() < step * 1e-9 { 0.0 } else { v });
        k += 1.0;
    }
    out
}
