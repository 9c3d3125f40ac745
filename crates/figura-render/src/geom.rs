//! Pixel-space geometry aliases shared by the renderers.

pub type Point = euclid::default::Point2D<f64>;
pub type Vector = euclid::default::Vector2D<f64>;
pub type Rect = euclid::default::Rect<f64>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    euclid::rect(x, y, width, height)
}

/// Unit vector along `v`, or `None` for a zero or non-finite vector.
pub fn unit(v: Vector) -> Option<Vector> {
    let len = v.length();
    (len.is_finite() && len > 1e-9).then(|| v / len)
}

/// Screen bearing of `to` seen from `from`, in degrees within `[0, 360)`.
pub fn bearing_deg(from: Point, to: Point) -> f64 {
    let deg = (to.y - from.y).atan2(to.x - from.x).to_degrees();
    if deg < 0.0 { deg + 360.0 } else { deg }
}

/// Signed turn from bearing `from` to bearing `to`, wrapped into `(-180, 180]`.
pub fn bearing_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

pub fn polar(center: Point, radius: f64, deg: f64) -> Point {
    let rad = deg.to_radians();
    point(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}

pub fn tuple(p: Point) -> (f64, f64) {
    (p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_delta_takes_the_short_way_round() {
        assert_eq!(bearing_delta(10.0, 50.0), 40.0);
        assert_eq!(bearing_delta(0.0, 323.0), -37.0);
        assert_eq!(bearing_delta(350.0, 20.0), 30.0);
        assert_eq!(bearing_delta(0.0, 180.0), 180.0);
        assert_eq!(bearing_delta(90.0, -90.0), 180.0);
    }
}
