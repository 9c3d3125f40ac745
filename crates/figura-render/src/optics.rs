//! Thin-lens ray diagrams on a horizontal optical axis.

use crate::mapper::{Bounds, CoordinateMapper};
use crate::svg::{ARROW_HEAD_SIZE, Node, SvgDocument, arrow, arrow_head};
use crate::{RenderContext, Result};
use figura_core::DomainTag;
use figura_core::models::optics::{OpticalElement, OpticalKind, OpticsData};

/// Object and lens closer than this (or an object this close to a focal point) draw no image.
pub const MIN_SEPARATION: f64 = 1.0;
const RAY_COLOR: &str = "#ea580c";

/// A lens reduced to what the thin-lens equation needs. Diverging lenses carry a negative focal
/// length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThinLens {
    pub position: f64,
    pub focal: f64,
}

/// Where a lens forms the image of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensImage {
    /// Signed image distance; negative for virtual images.
    pub distance: f64,
    pub position: f64,
    /// Closed-form height. Positive for a positive object means inverted; the tip is drawn at
    /// `-height`.
    pub height: f64,
}

impl LensImage {
    pub fn is_virtual(&self) -> bool {
        self.distance < 0.0
    }

    pub fn tip_y(&self) -> f64 {
        -self.height
    }
}

impl ThinLens {
    pub fn from_element(el: &OpticalElement) -> Option<Self> {
        let f = el.focal_magnitude();
        let focal = match el.optical_kind() {
            OpticalKind::ConvexLens => f,
            OpticalKind::ConcaveLens => -f,
            _ => return None,
        };
        Some(Self {
            position: el.position,
            focal,
        })
    }

    /// Image of an object of height `h` standing at `object`. `None` when the construction is
    /// singular: the object sits on the lens or on a focal point.
    pub fn image_of(&self, object: f64, h: f64) -> Option<LensImage> {
        let d = (self.position - object).abs();
        if !(d.is_finite() && h.is_finite()) || d < MIN_SEPARATION {
            return None;
        }
        if (d - self.focal).abs() < MIN_SEPARATION {
            return None;
        }
        let u = object - self.position;
        let v = self.focal * d / (d - self.focal);
        let side = (self.position - object).signum();
        Some(LensImage {
            distance: v,
            position: self.position + v * side,
            height: -(v / u) * h,
        })
    }
}

fn axis_bounds(data: &OpticsData) -> (f64, f64) {
    if let Some([a, b]) = data.axis_range {
        if a.is_finite() && b.is_finite() && (a - b).abs() > 1e-9 {
            return (a.min(b), a.max(b));
        }
    }
    let reach = data
        .elements
        .iter()
        .filter(|el| {
            matches!(
                el.optical_kind(),
                OpticalKind::ConvexLens | OpticalKind::ConcaveLens
            )
        })
        .map(|el| el.focal_magnitude() * 2.0)
        .fold(0.0_f64, f64::max);
    let reach = if reach > 0.0 {
        reach
    } else {
        OpticalElement::DEFAULT_FOCAL_LENGTH * 2.0
    };
    let positions = data
        .elements
        .iter()
        .map(|el| el.position)
        .filter(|p| p.is_finite());
    let (lo, hi) = positions.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p), hi.max(p))
    });
    if lo > hi {
        return (-reach, reach);
    }
    (lo - reach, hi + reach)
}

pub fn render_optics(data: &OpticsData, ctx: &RenderContext) -> Result<SvgDocument> {
    let canvas = ctx.canvas(DomainTag::Optics);
    let (x_lo, x_hi) = axis_bounds(data);

    let lens = data.elements.iter().find_map(ThinLens::from_element);
    let object = data
        .elements
        .iter()
        .find(|el| el.optical_kind() == OpticalKind::Object && el.position.is_finite());
    let image = match (lens, object) {
        (Some(lens), Some(obj)) => lens.image_of(obj.position, obj.object_height()),
        _ => None,
    };

    let tallest = data
        .elements
        .iter()
        .filter(|el| el.optical_kind() == OpticalKind::Object)
        .map(|el| el.object_height().abs())
        .fold(OpticalElement::DEFAULT_HEIGHT, f64::max);
    let image_extent = image
        .map(|img| img.height.abs())
        .filter(|h| *h <= tallest * 4.0)
        .unwrap_or(0.0);
    let y_max = tallest.max(image_extent) * 1.3;
    let mapper = CoordinateMapper::stretch(
        Bounds::new(x_lo, x_hi, -y_max, y_max),
        canvas.viewport(),
    );
    let plot = mapper.plot_rect();
    let stroke = ctx.settings.stroke.as_str();
    let font_size = ctx.settings.font_size;

    let mut doc = ctx.document(DomainTag::Optics, canvas.width, canvas.height);
    let clip_id = format!("{}-clip", ctx.next_id());
    doc.push_def(Node::clip_path(
        clip_id.clone(),
        Node::rect(plot.min_x(), plot.min_y(), plot.width(), plot.height()),
    ));

    let axis_y = mapper.map_y(0.0);
    doc.push(
        Node::line(plot.min_x(), axis_y, plot.max_x(), axis_y)
            .class("optical-axis")
            .stroke(crate::MUTED)
            .dashed("8 3 2 3"),
    );

    let mut elements = Node::group().class("elements");
    for el in &data.elements {
        if !el.position.is_finite() {
            continue;
        }
        let px = mapper.map_x(el.position);
        match el.optical_kind() {
            OpticalKind::ConvexLens | OpticalKind::ConcaveLens => {
                elements.push(lens_glyph(el, &mapper, ctx));
            }
            OpticalKind::Object => {
                let tip = (px, mapper.map_y(el.object_height()));
                if let Some(node) = arrow((px, axis_y), tip, ctx.settings.color(0), 2.5) {
                    elements.push(node);
                }
                if let Some(label) = el.label.as_deref().filter(|l| !l.is_empty()) {
                    elements.push(
                        Node::text(px, axis_y + 16.0, label)
                            .anchor("middle")
                            .font_size(font_size)
                            .fill(stroke),
                    );
                }
            }
            OpticalKind::Other => {
                elements.push(
                    Node::line(px, plot.min_y() + 10.0, px, plot.max_y() - 10.0)
                        .stroke(crate::MUTED)
                        .stroke_width(3.0),
                );
                let text = el.label.as_deref().unwrap_or(el.kind.as_str());
                elements.push(
                    Node::text(px, plot.min_y() + 6.0, text)
                        .anchor("middle")
                        .font_size(font_size - 1.0)
                        .fill(crate::MUTED),
                );
            }
        }
    }
    doc.push(elements);

    if let (Some(lens), Some(obj), Some(img)) = (lens, object, image) {
        let mut rays = Node::group()
            .class("rays")
            .attr("clip-path", format!("url(#{clip_id})"));
        if data.show_rays {
            trace_rays(&mut rays, lens, obj, img, (x_lo, x_hi), &mapper);
        }
        doc.push(rays);

        let base = (mapper.map_x(img.position), axis_y);
        let tip = (base.0, mapper.map_y(img.tip_y()));
        let mut image_group = Node::group()
            .class(if img.is_virtual() {
                "image image-virtual"
            } else {
                "image image-real"
            })
            .attr("clip-path", format!("url(#{clip_id})"));
        let color = ctx.settings.color(1);
        let mut shaft = Node::line(base.0, base.1, tip.0, tip.1)
            .stroke(color)
            .stroke_width(2.5);
        if img.is_virtual() {
            shaft = shaft.dashed("5 3");
        }
        image_group.push(shaft);
        if let Some(head) = arrow_head(base, tip, ARROW_HEAD_SIZE) {
            image_group.push(head.fill(color));
        }
        if let Some(label) = obj.label.as_deref().filter(|l| !l.is_empty()) {
            image_group.push(
                Node::text(base.0, axis_y + 16.0, format!("{label}'"))
                    .anchor("middle")
                    .font_size(font_size)
                    .fill(color),
            );
        }
        doc.push(image_group);
    } else if lens.is_some() && object.is_some() {
        tracing::debug!("optics: object at the lens or a focal point, image suppressed");
    }

    Ok(doc)
}

fn lens_glyph(el: &OpticalElement, mapper: &CoordinateMapper, ctx: &RenderContext) -> Node {
    let plot = mapper.plot_rect();
    let px = mapper.map_x(el.position);
    let axis_y = mapper.map_y(0.0);
    let top = plot.min_y() + 8.0;
    let bottom = plot.max_y() - 8.0;
    let convex = el.optical_kind() == OpticalKind::ConvexLens;
    let color = ctx.settings.color(5);
    let size = ARROW_HEAD_SIZE;

    let mut group = Node::group().class(if convex {
        "lens lens-convex"
    } else {
        "lens lens-concave"
    });
    group.push(
        Node::line(px, top, px, bottom)
            .stroke(color)
            .stroke_width(2.5),
    );
    let heads = if convex {
        [
            arrow_head((px, axis_y), (px, top), size),
            arrow_head((px, axis_y), (px, bottom), size),
        ]
    } else {
        [
            arrow_head((px, top - size * 2.0), (px, top), size),
            arrow_head((px, bottom + size * 2.0), (px, bottom), size),
        ]
    };
    for head in heads.into_iter().flatten() {
        group.push(head.fill(color));
    }

    let f = el.focal_magnitude();
    let bounds = mapper.bounds();
    for (k, name) in [(1.0, "F"), (2.0, "2F")] {
        for side in [-1.0, 1.0] {
            let x = el.position + side * k * f;
            if !bounds.contains_x(x) {
                continue;
            }
            let fx = mapper.map_x(x);
            group.push(Node::circle(fx, axis_y, 2.5).fill(ctx.settings.stroke.as_str()));
            group.push(
                Node::text(fx, axis_y + 15.0, name)
                    .class("focal-mark")
                    .anchor("middle")
                    .font_size(ctx.settings.font_size - 1.0)
                    .fill(ctx.settings.stroke.as_str()),
            );
        }
    }
    if let Some(label) = el.label.as_deref().filter(|l| !l.is_empty()) {
        group.push(
            Node::text(px, top - 2.0, label)
                .anchor("middle")
                .font_size(ctx.settings.font_size)
                .fill(color),
        );
    }
    group
}

/// The parallel ray (refracted through, or diverging from, the focal point) and the chief ray
/// through the optical center, run out to the far edge of the axis. Virtual images get dashed
/// back-extensions to the image tip.
fn trace_rays(
    out: &mut Node,
    lens: ThinLens,
    obj: &OpticalElement,
    img: LensImage,
    (x_lo, x_hi): (f64, f64),
    mapper: &CoordinateMapper,
) {
    let h = obj.object_height();
    let xo = obj.position;
    let xl = lens.position;
    let forward = (xl - xo).signum();
    let far_x = if forward > 0.0 { x_hi } else { x_lo };
    let reach = (far_x - xl).abs().max(0.0);
    let d = (xl - xo).abs();

    let seg = |a: (f64, f64), b: (f64, f64)| {
        let (p, q) = (mapper.map(a.0, a.1), mapper.map(b.0, b.1));
        Node::line(p.x, p.y, q.x, q.y)
            .stroke(RAY_COLOR)
            .stroke_width(1.3)
    };

    // Parallel ray: bends at the lens towards (or away from) the focal point.
    let y_parallel = |t: f64| h - h * t / lens.focal;
    out.push(seg((xo, h), (xl, h)));
    out.push(seg((xl, h), (far_x, y_parallel(reach))));

    // Chief ray: straight through the center.
    let slope = -h / d;
    out.push(seg((xo, h), (far_x, h + slope * (far_x - xo).abs())));

    if img.is_virtual() {
        let tip = (img.position, img.tip_y());
        out.push(seg((xl, h), tip).dashed("4 3").stroke_width(1.0));
        out.push(seg((xl, 0.0), tip).dashed("4 3").stroke_width(1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_image_at_twice_the_focal_length() {
        let lens = ThinLens {
            position: 0.0,
            focal: 10.0,
        };
        let img = lens.image_of(-20.0, 4.0).unwrap();
        assert_eq!(img.distance, 20.0);
        assert_eq!(img.position, 20.0);
        assert_eq!(img.height, 4.0);
        assert_eq!(img.tip_y(), -4.0);
        assert!(!img.is_virtual());
    }

    #[test]
    fn object_inside_focal_length_gives_upright_virtual_image() {
        let lens = ThinLens {
            position: 0.0,
            focal: 10.0,
        };
        let img = lens.image_of(-5.0, 2.0).unwrap();
        assert!(img.is_virtual());
        assert_eq!(img.position, -10.0);
        assert!(img.tip_y() > 2.0);
    }

    #[test]
    fn diverging_lens_image_is_virtual_and_reduced() {
        let lens = ThinLens {
            position: 0.0,
            focal: -10.0,
        };
        let img = lens.image_of(-20.0, 3.0).unwrap();
        assert!(img.is_virtual());
        assert!(img.position < 0.0 && img.position > -10.0);
        assert!(img.tip_y() > 0.0 && img.tip_y() < 3.0);
    }

    #[test]
    fn singular_constructions_have_no_image() {
        let lens = ThinLens {
            position: 0.0,
            focal: 10.0,
        };
        assert_eq!(lens.image_of(0.5, 2.0), None);
        assert_eq!(lens.image_of(-10.2, 2.0), None);
    }
}
