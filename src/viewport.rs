use crate::config::BoardConfig;
use crate::geometry::{canvas_to_screen, screen_to_canvas, Point, Size};

/// Window onto the virtual canvas. `scroll` is in screen pixels and is the
/// top-left of the visible area in scaled canvas space; `origin` is the
/// element's screen-space top-left and `size` its pixel size.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub scroll: Point,
    pub origin: Point,
    pub size: Size,
    pub canvas_size: Size,
    min_scale: f64,
    max_scale: f64,
    zoom_step: f64,
}

impl Viewport {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            scale: 1.0,
            scroll: Point::default(),
            origin: Point::default(),
            size: Size::new(0.0, 0.0),
            canvas_size: config.canvas_size(),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_step: config.zoom_step,
        }
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        screen_to_canvas(screen, self.origin, self.scroll, self.scale)
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        canvas_to_screen(canvas, self.origin, self.scroll, self.scale)
    }

    /// Records the element's on-screen box; called whenever it is measured.
    pub fn set_bounds(&mut self, origin: Point, size: Size) {
        self.origin = origin;
        self.size = size;
    }

    /// Canvas point under the middle of the element.
    pub fn visual_center(&self) -> Point {
        let half = self.size.half();
        Point::new(
            (self.scroll.x + half.x) / self.scale,
            (self.scroll.y + half.y) / self.scale,
        )
    }

    pub fn scroll_to(&mut self, scroll: Point) {
        self.scroll = scroll.clamp_non_negative();
    }

    /// Adds a screen-pixel delta to the scroll offset.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.scroll_to(self.scroll.offset(dx, dy));
    }

    pub fn zoom_in(&mut self) {
        self.zoom_about_center(self.scale + self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_about_center(self.scale - self.zoom_step);
    }

    fn zoom_about_center(&mut self, scale: f64) {
        let half = self.size.half();
        self.zoom_about(Point::new(self.origin.x + half.x, self.origin.y + half.y), scale);
    }

    /// Sets the scale (clamped) keeping the canvas point under `focus`
    /// (a screen point) fixed on screen.
    pub fn zoom_about(&mut self, focus: Point, scale: f64) {
        let old = self.scale;
        let new = scale.clamp(self.min_scale, self.max_scale);
        if new == old {
            return;
        }
        let local = focus.sub(self.origin);
        let anchored = self.scroll.add(local);
        let ratio = new / old;
        self.scale = new;
        self.scroll_to(Point::new(anchored.x * ratio - local.x, anchored.y * ratio - local.y));
    }

    /// Scale back to 1 and center on the middle of the canvas.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.center_on(self.canvas_size.half());
    }

    /// Scrolls so `canvas_point` sits at the visual center.
    pub fn center_on(&mut self, canvas_point: Point) {
        let half = self.size.half();
        self.scroll_to(Point::new(
            canvas_point.x * self.scale - half.x,
            canvas_point.y * self.scale - half.y,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn viewport() -> Viewport {
        let mut vp = Viewport::new(&BoardConfig::default());
        vp.set_bounds(Point::new(24.0, 120.0), Size::new(1200.0, 800.0));
        vp
    }

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS, "{:?} != {:?}", a, b);
    }

    mod zoom_tests {
        use super::*;

        #[test]
        fn zoom_in_keeps_visual_center() {
            let mut vp = viewport();
            vp.scroll_to(Point::new(1000.0, 800.0));
            let before = vp.visual_center();
            vp.zoom_in();
            assert!((vp.scale - 1.1).abs() < EPS);
            assert_close(vp.visual_center(), before);
        }

        #[test]
        fn zoom_out_keeps_visual_center() {
            let mut vp = viewport();
            vp.scroll_to(Point::new(1000.0, 800.0));
            let before = vp.visual_center();
            vp.zoom_out();
            assert!((vp.scale - 0.9).abs() < EPS);
            assert_close(vp.visual_center(), before);
        }

        #[test]
        fn repeated_zoom_clamps_to_range() {
            let mut vp = viewport();
            vp.scroll_to(Point::new(2000.0, 2000.0));
            for _ in 0..50 {
                vp.zoom_in();
            }
            assert!((vp.scale - 2.0).abs() < EPS);
            for _ in 0..50 {
                vp.zoom_out();
            }
            assert!((vp.scale - 0.3).abs() < EPS);
        }

        #[test]
        fn zoom_at_limit_changes_nothing() {
            let mut vp = viewport();
            vp.scale = 2.0;
            vp.scroll_to(Point::new(500.0, 500.0));
            let before = vp.clone();
            vp.zoom_in();
            assert_eq!(vp, before);
        }

        #[test]
        fn zoom_about_pointer_keeps_point_under_pointer() {
            let mut vp = viewport();
            vp.scroll_to(Point::new(900.0, 700.0));
            let focus = Point::new(300.0, 450.0);
            let under = vp.screen_to_canvas(focus);
            vp.zoom_about(focus, 1.5);
            assert_close(vp.screen_to_canvas(focus), under);
        }

        #[test]
        fn zoom_leaves_scroll_non_negative() {
            let mut vp = viewport();
            vp.zoom_out();
            assert!(vp.scroll.x >= 0.0 && vp.scroll.y >= 0.0);
        }
    }

    mod pan_tests {
        use super::*;

        #[test]
        fn pan_clamps_at_origin() {
            let mut vp = viewport();
            vp.scroll_to(Point::new(10.0, 10.0));
            vp.pan(-50.0, -50.0);
            assert_eq!(vp.scroll, Point::new(0.0, 0.0));
        }

        #[test]
        fn pan_adds_delta() {
            let mut vp = viewport();
            vp.pan(30.0, 45.5);
            vp.pan(10.0, -5.5);
            assert_eq!(vp.scroll, Point::new(40.0, 40.0));
        }
    }

    mod reset_tests {
        use super::*;

        #[test]
        fn reset_returns_to_unit_scale_on_canvas_midpoint() {
            let mut vp = viewport();
            vp.zoom_in();
            vp.reset();
            assert_eq!(vp.scale, 1.0);
            assert_close(vp.visual_center(), Point::new(2000.0, 1500.0));
        }

        #[test]
        fn center_on_point() {
            let mut vp = viewport();
            vp.center_on(Point::new(900.0, 500.0));
            assert_close(vp.visual_center(), Point::new(900.0, 500.0));
        }
    }

    #[test]
    fn screen_canvas_round_trip_through_viewport() {
        let mut vp = viewport();
        vp.scale = 0.7;
        vp.scroll_to(Point::new(333.0, 41.0));
        let screen = Point::new(640.0, 512.0);
        assert_close(vp.canvas_to_screen(vp.screen_to_canvas(screen)), screen);
    }

    #[test]
    fn zoom_does_not_touch_task_positions() {
        let mut board = crate::board::Board::new();
        board.add_node(crate::state::Task::new("A", 100.0, 100.0, "")).unwrap();
        let before = board.clone();
        let mut vp = viewport();
        vp.zoom_in();
        vp.zoom_out();
        vp.reset();
        assert_eq!(board, before);
    }
}
