use serde::{Deserialize, Serialize};

/// Fraction of the horizontal span used to offset both bezier control points.
pub const CONTROL_RATIO: f64 = 0.4;

const HIT_SAMPLES: usize = 32;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn sub(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn add(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Clamps both axes to be non-negative.
    pub fn clamp_non_negative(self) -> Self {
        Self::new(self.x.max(0.0), self.y.max(0.0))
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn half(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x && p.x <= self.right() && p.y >= self.origin.y && p.y <= self.bottom()
    }

    /// Midpoint of the left or right edge.
    pub fn anchor(&self, side: Side) -> Point {
        let y = self.origin.y + self.size.height / 2.0;
        match side {
            Side::Left => Point::new(self.origin.x, y),
            Side::Right => Point::new(self.right(), y),
        }
    }

    /// Returns the side whose handle band contains `local_x`, if any.
    /// `local_x` is measured from the left edge, in canvas units.
    pub fn handle_side(&self, local_x: f64, handle_zone: f64) -> Option<Side> {
        if local_x <= handle_zone {
            Some(Side::Left)
        } else if local_x >= self.size.width - handle_zone {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Cubic bezier in canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bezier {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl Bezier {
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        Point::new(
            a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
            a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
        )
    }

    /// Approximate distance from `p` to the curve, measured against a polyline
    /// of evenly spaced samples.
    pub fn distance_to(&self, p: Point) -> f64 {
        let mut best = f64::INFINITY;
        let mut prev = self.start;
        for i in 1..=HIT_SAMPLES {
            let next = self.point_at(i as f64 / HIT_SAMPLES as f64);
            best = best.min(distance_to_segment(p, prev, next));
            prev = next;
        }
        best
    }

    /// True when `p` lies inside a stroke of `stroke_width` following the curve.
    pub fn hit(&self, p: Point, stroke_width: f64) -> bool {
        self.distance_to(p) <= stroke_width / 2.0
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Maps a pointer position to canvas space. `origin` is the viewport element's
/// screen-space top-left.
pub fn screen_to_canvas(screen: Point, origin: Point, scroll: Point, scale: f64) -> Point {
    Point::new(
        (screen.x - origin.x + scroll.x) / scale,
        (screen.y - origin.y + scroll.y) / scale,
    )
}

/// Exact inverse of [`screen_to_canvas`].
pub fn canvas_to_screen(canvas: Point, origin: Point, scroll: Point, scale: f64) -> Point {
    Point::new(
        canvas.x * scale - scroll.x + origin.x,
        canvas.y * scale - scroll.y + origin.y,
    )
}

/// Horizontal S-curve from `start` to `end`. Used for both committed
/// connectors and the transient link curve.
pub fn connector_between(start: Point, end: Point) -> Bezier {
    let dx = end.x - start.x;
    Bezier {
        start,
        control1: Point::new(start.x + dx * CONTROL_RATIO, start.y),
        control2: Point::new(end.x - dx * CONTROL_RATIO, end.y),
        end,
    }
}

/// Connector from the right-center of `from` to the left-center of `to`.
/// A missing rectangle (node not rendered) yields no path.
pub fn connector_path(from: Option<Rect>, to: Option<Rect>) -> Option<Bezier> {
    let (from, to) = (from?, to?);
    Some(connector_between(from.anchor(Side::Right), to.anchor(Side::Left)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    mod transform_tests {
        use super::*;

        #[test]
        fn identity_at_unit_scale_and_zero_scroll() {
            let p = screen_to_canvas(Point::new(100.0, 200.0), Point::default(), Point::default(), 1.0);
            assert_eq!(p, Point::new(100.0, 200.0));
        }

        #[test]
        fn subtracts_origin_adds_scroll_divides_scale() {
            let p = screen_to_canvas(
                Point::new(150.0, 130.0),
                Point::new(50.0, 30.0),
                Point::new(100.0, 300.0),
                2.0,
            );
            assert_eq!(p, Point::new(100.0, 200.0));
        }

        #[test]
        fn round_trip_screen_canvas_screen() {
            let origin = Point::new(12.0, 64.0);
            for &scale in &[0.3, 0.7, 1.0, 1.35, 2.0] {
                for &(sx, sy) in &[(0.0, 0.0), (12.5, 900.0), (1024.0, 33.3)] {
                    let scroll = Point::new(sx, sy);
                    let screen = Point::new(321.0, 77.5);
                    let canvas = screen_to_canvas(screen, origin, scroll, scale);
                    let back = canvas_to_screen(canvas, origin, scroll, scale);
                    assert!(close(back, screen), "scale {} scroll {:?}", scale, scroll);
                }
            }
        }
    }

    mod rect_tests {
        use super::*;

        fn card() -> Rect {
            Rect::new(Point::new(100.0, 100.0), Size::new(420.0, 64.0))
        }

        #[test]
        fn contains_includes_boundary() {
            let r = card();
            assert!(r.contains(Point::new(100.0, 100.0)));
            assert!(r.contains(Point::new(520.0, 164.0)));
            assert!(!r.contains(Point::new(99.9, 120.0)));
            assert!(!r.contains(Point::new(300.0, 164.1)));
        }

        #[test]
        fn anchors_sit_on_vertical_midpoint() {
            let r = card();
            assert_eq!(r.anchor(Side::Left), Point::new(100.0, 132.0));
            assert_eq!(r.anchor(Side::Right), Point::new(520.0, 132.0));
        }

        #[test]
        fn handle_side_bands() {
            let r = card();
            assert_eq!(r.handle_side(0.0, 20.0), Some(Side::Left));
            assert_eq!(r.handle_side(20.0, 20.0), Some(Side::Left));
            assert_eq!(r.handle_side(21.0, 20.0), None);
            assert_eq!(r.handle_side(210.0, 20.0), None);
            assert_eq!(r.handle_side(400.0, 20.0), Some(Side::Right));
            assert_eq!(r.handle_side(415.0, 20.0), Some(Side::Right));
        }
    }

    mod connector_tests {
        use super::*;

        #[test]
        fn control_points_use_forty_percent_of_span() {
            let b = connector_between(Point::new(0.0, 10.0), Point::new(100.0, 50.0));
            assert!(close(b.control1, Point::new(40.0, 10.0)));
            assert!(close(b.control2, Point::new(60.0, 50.0)));
        }

        #[test]
        fn wrap_around_keeps_formula() {
            // Target left of source: the controls cross over, which is accepted.
            let b = connector_between(Point::new(500.0, 0.0), Point::new(100.0, 100.0));
            assert!(close(b.control1, Point::new(340.0, 0.0)));
            assert!(close(b.control2, Point::new(260.0, 100.0)));
        }

        #[test]
        fn path_runs_right_center_to_left_center() {
            let size = Size::new(420.0, 64.0);
            let a = Rect::new(Point::new(0.0, 0.0), size);
            let b = Rect::new(Point::new(600.0, 100.0), size);
            let path = connector_path(Some(a), Some(b)).unwrap();
            assert_eq!(path.start, Point::new(420.0, 32.0));
            assert_eq!(path.end, Point::new(600.0, 132.0));
        }

        #[test]
        fn missing_rect_yields_no_path() {
            let r = Rect::new(Point::default(), Size::new(10.0, 10.0));
            assert!(connector_path(Some(r), None).is_none());
            assert!(connector_path(None, Some(r)).is_none());
        }

        #[test]
        fn curve_endpoints_match_anchors() {
            let b = connector_between(Point::new(3.0, 4.0), Point::new(90.0, -20.0));
            assert!(close(b.point_at(0.0), b.start));
            assert!(close(b.point_at(1.0), b.end));
        }
    }

    mod hit_tests {
        use super::*;

        #[test]
        fn straight_connector_hit_within_half_stroke() {
            let b = connector_between(Point::new(0.0, 50.0), Point::new(200.0, 50.0));
            assert!(b.hit(Point::new(100.0, 55.0), 12.0));
            assert!(b.hit(Point::new(100.0, 44.0), 12.0));
            assert!(!b.hit(Point::new(100.0, 57.0), 12.0));
        }

        #[test]
        fn curved_connector_hit_on_midpoint() {
            let b = connector_between(Point::new(0.0, 0.0), Point::new(200.0, 100.0));
            let mid = b.point_at(0.5);
            assert!(b.hit(mid, 12.0));
            assert!(!b.hit(Point::new(0.0, 100.0), 12.0));
        }

        #[test]
        fn degenerate_curve_measures_point_distance() {
            let p = Point::new(5.0, 5.0);
            let b = connector_between(p, p);
            assert!((b.distance_to(Point::new(8.0, 9.0)) - 5.0).abs() < EPS);
        }
    }
}
