use crate::board::Board;
use crate::demo::axis_color;
use crate::filter::VisibleSet;
use crate::geometry::{Bezier, Point, Rect};
use crate::gesture::GestureEngine;
use crate::state::{Priority, Status, Task};
use crate::viewport::Viewport;
use std::f64::consts::PI;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const BG_COLOR: &str = "#f9fafb";
const GRID_COLOR: &str = "#eef0f3";
const CARD_BG: &str = "#ffffff";
const BORDER_COLOR: &str = "#e5e7eb";
const BORDER_SELECTED: &str = "#2563eb";
const TEXT_COLOR: &str = "#111827";
const TEXT_DIM: &str = "#4b5563";
const EDGE_ACTIVE: &str = "#374151";
const EDGE_RESOLVED: &str = "#9ca3af";
const EDGE_PREVIEW: &str = "#2563eb";
const TARGET_VALID: &str = "#22c55e";
const TARGET_INVALID: &str = "#ef4444";
const FONT: &str = "Inter, system-ui, sans-serif";
const ARROW_SIZE: f64 = 10.0;

/// Screen-space projection for the current frame. Canvas drawing coordinates
/// are relative to the element, so the viewport origin is dropped.
struct Projection<'a> {
    viewport: &'a Viewport,
}

impl Projection<'_> {
    fn point(&self, p: Point) -> Point {
        self.viewport.canvas_to_screen(p).sub(self.viewport.origin)
    }

    fn len(&self, v: f64) -> f64 {
        v * self.viewport.scale
    }
}

pub fn render_board(
    ctx: &CanvasRenderingContext2d,
    canvas: &HtmlCanvasElement,
    board: &Board,
    viewport: &Viewport,
    engine: &GestureEngine,
    visible: &VisibleSet,
    editing_node: Option<&String>,
) {
    let width = canvas.width() as f64;
    let height = canvas.height() as f64;
    let proj = Projection { viewport };

    ctx.set_fill_style_str(BG_COLOR);
    ctx.fill_rect(0.0, 0.0, width, height);

    draw_grid(ctx, viewport, width, height);

    for edge in board.list_edges() {
        // Dangling or filtered endpoints route to nothing.
        let Some(path) = engine.route(board, visible, edge) else {
            continue;
        };
        let resolved = board
            .get_node(&edge.from)
            .is_some_and(|t| t.details.status == Status::Done);
        draw_connector(ctx, &proj, &path, resolved);
    }

    if let Some(preview) = engine.link_preview() {
        draw_link_preview(ctx, &proj, &preview);
    }

    for task in board.list_nodes() {
        if !visible.contains(&task.id) {
            continue;
        }
        let Some(rect) = engine.node_rect(board, visible, &task.id) else {
            continue;
        };
        let is_selected = engine.selected() == Some(task.id.as_str());
        let is_editing = editing_node.is_some_and(|id| id == &task.id);
        draw_task(ctx, &proj, task, rect, is_selected, engine.is_dragging(&task.id), is_editing);
    }

    if let Some(hover) = engine.link().and_then(|link| link.hover.as_ref()) {
        if let Some(rect) = engine.node_rect(board, visible, &hover.node_id) {
            let color = if hover.valid { TARGET_VALID } else { TARGET_INVALID };
            draw_ring(ctx, &proj, rect, color);
        }
    }
}

fn draw_grid(ctx: &CanvasRenderingContext2d, viewport: &Viewport, width: f64, height: f64) {
    let grid_size = 40.0 * viewport.scale;
    if grid_size < 10.0 {
        return;
    }

    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(1.0);

    let offset_x = viewport.scroll.x % grid_size;
    let offset_y = viewport.scroll.y % grid_size;

    let mut x = -offset_x;
    while x < width {
        ctx.begin_path();
        ctx.move_to(x, 0.0);
        ctx.line_to(x, height);
        ctx.stroke();
        x += grid_size;
    }

    let mut y = -offset_y;
    while y < height {
        ctx.begin_path();
        ctx.move_to(0.0, y);
        ctx.line_to(width, y);
        ctx.stroke();
        y += grid_size;
    }
}

fn pill_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64) {
    let r = (h / 2.0).min(w / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    let _ = ctx.arc(x + w - r, y + r, r, -PI / 2.0, PI / 2.0);
    ctx.line_to(x + r, y + h);
    let _ = ctx.arc(x + r, y + r, r, PI / 2.0, PI * 1.5);
    ctx.close_path();
}

fn status_colors(status: Status) -> (&'static str, &'static str) {
    match status {
        Status::Draft => ("#e5e7eb", "#374151"),
        Status::ToDo => ("#dbeafe", "#1e40af"),
        Status::Doing => ("#fef3c7", "#92400e"),
        Status::Done => ("#dcfce7", "#166534"),
    }
}

fn priority_colors(priority: Priority) -> (&'static str, &'static str) {
    match priority {
        Priority::Low => ("#f3f4f6", "#4b5563"),
        Priority::Medium => ("#e0e7ff", "#3730a3"),
        Priority::High => ("#ffedd5", "#9a3412"),
        Priority::Critical => ("#fee2e2", "#991b1b"),
    }
}

fn draw_task(
    ctx: &CanvasRenderingContext2d,
    proj: &Projection,
    task: &Task,
    rect: Rect,
    is_selected: bool,
    is_dragging: bool,
    is_editing: bool,
) {
    let origin = proj.point(rect.origin);
    let (x, y) = (origin.x, origin.y);
    let w = proj.len(rect.size.width);
    let h = proj.len(rect.size.height);
    let r = h / 2.0;

    if is_dragging {
        ctx.set_shadow_color("rgba(0, 0, 0, 0.25)");
        ctx.set_shadow_blur(16.0);
    } else {
        ctx.set_shadow_color("rgba(0, 0, 0, 0.12)");
        ctx.set_shadow_blur(6.0);
    }
    pill_path(ctx, x, y, w, h);
    ctx.set_fill_style_str(CARD_BG);
    ctx.fill();
    ctx.set_shadow_blur(0.0);

    // Axis halo.
    ctx.set_stroke_style_str(&axis_color(&task.details.axis_id));
    ctx.set_global_alpha(0.2);
    ctx.set_line_width(proj.len(6.0));
    ctx.stroke();
    ctx.set_global_alpha(1.0);

    if task.temporary {
        let _ = ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from_f64(6.0), &JsValue::from_f64(4.0)));
    }
    ctx.set_stroke_style_str(if is_selected { BORDER_SELECTED } else { BORDER_COLOR });
    ctx.set_line_width(if is_selected { 2.0 } else { 1.0 });
    ctx.stroke();
    let _ = ctx.set_line_dash(&js_sys::Array::new());

    let small_font = (9.0 * proj.viewport.scale).max(6.0);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");

    let (status_bg, status_fg) = status_colors(task.details.status);
    ctx.begin_path();
    let _ = ctx.arc(x + r, y + r, r, 0.0, PI * 2.0);
    ctx.set_fill_style_str(status_bg);
    ctx.fill();
    ctx.set_fill_style_str(status_fg);
    ctx.set_font(&format!("bold {}px {}", small_font, FONT));
    let _ = ctx.fill_text_with_max_width(task.details.status.label(), x + r, y + r, h - 4.0);

    let (priority_bg, priority_fg) = priority_colors(task.details.priority);
    ctx.begin_path();
    let _ = ctx.arc(x + w - r, y + r, r, 0.0, PI * 2.0);
    ctx.set_fill_style_str(priority_bg);
    ctx.fill();
    ctx.set_fill_style_str(priority_fg);
    let _ = ctx.fill_text(task.details.priority.label(), x + w - r, y + r - h * 0.18);
    let _ = ctx.fill_text(&task.details.initials(), x + w - r, y + r + h * 0.18);

    if !is_editing {
        let font_size = (13.0 * proj.viewport.scale).max(7.0);
        ctx.set_text_align("left");
        ctx.set_fill_style_str(TEXT_COLOR);
        ctx.set_font(&format!("600 {}px {}", font_size, FONT));
        let text_x = x + h + proj.len(8.0);
        let max_width = (w - 2.0 * h - proj.len(16.0)).max(0.0);
        let title_y = if task.details.due.is_some() { y + h * 0.36 } else { y + r };
        let _ = ctx.fill_text_with_max_width(&task.details.title, text_x, title_y, max_width);

        if let Some(due) = &task.details.due {
            let dates = match &task.details.start {
                Some(start) => format!("{} -> {}", start, due),
                None => due.clone(),
            };
            ctx.set_fill_style_str(TEXT_DIM);
            ctx.set_font(&format!("{}px {}", (11.0 * proj.viewport.scale).max(6.0), FONT));
            let _ = ctx.fill_text_with_max_width(&dates, text_x, y + h * 0.68, max_width);
        }
    }
}

fn trace_bezier(ctx: &CanvasRenderingContext2d, proj: &Projection, path: &Bezier) -> (Point, Point) {
    let start = proj.point(path.start);
    let c1 = proj.point(path.control1);
    let c2 = proj.point(path.control2);
    let end = proj.point(path.end);
    ctx.begin_path();
    ctx.move_to(start.x, start.y);
    ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, end.x, end.y);
    (c2, end)
}

fn draw_arrowhead(ctx: &CanvasRenderingContext2d, from: Point, tip: Point, size: f64) {
    let dx = tip.x - from.x;
    let dy = tip.y - from.y;
    let angle = if dx == 0.0 && dy == 0.0 { 0.0 } else { dy.atan2(dx) };
    let spread = PI / 7.0;
    ctx.begin_path();
    ctx.move_to(tip.x, tip.y);
    ctx.line_to(tip.x - size * (angle - spread).cos(), tip.y - size * (angle - spread).sin());
    ctx.line_to(tip.x - size * (angle + spread).cos(), tip.y - size * (angle + spread).sin());
    ctx.close_path();
    ctx.fill();
}

fn draw_connector(ctx: &CanvasRenderingContext2d, proj: &Projection, path: &Bezier, resolved: bool) {
    let color = if resolved { EDGE_RESOLVED } else { EDGE_ACTIVE };
    if resolved {
        let _ = ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(4.0)));
    }
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(2.0);
    let (c2, end) = trace_bezier(ctx, proj, path);
    ctx.stroke();
    let _ = ctx.set_line_dash(&js_sys::Array::new());

    ctx.set_fill_style_str(color);
    draw_arrowhead(ctx, c2, end, ARROW_SIZE);
}

fn draw_link_preview(ctx: &CanvasRenderingContext2d, proj: &Projection, path: &Bezier) {
    ctx.set_stroke_style_str(EDGE_PREVIEW);
    ctx.set_line_width(2.0);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from_f64(6.0), &JsValue::from_f64(4.0)));
    trace_bezier(ctx, proj, path);
    ctx.stroke();
    let _ = ctx.set_line_dash(&js_sys::Array::new());

    let tip = proj.point(path.end);
    ctx.begin_path();
    let _ = ctx.arc(tip.x, tip.y, 4.0, 0.0, PI * 2.0);
    ctx.set_fill_style_str(EDGE_PREVIEW);
    ctx.fill();
}

fn draw_ring(ctx: &CanvasRenderingContext2d, proj: &Projection, rect: Rect, color: &str) {
    let pad = 4.0;
    let origin = proj.point(rect.origin);
    pill_path(
        ctx,
        origin.x - pad,
        origin.y - pad,
        proj.len(rect.size.width) + pad * 2.0,
        proj.len(rect.size.height) + pad * 2.0,
    );
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(3.0);
    ctx.stroke();
}

pub fn get_canvas_context(
    canvas: &HtmlCanvasElement,
) -> Result<CanvasRenderingContext2d, JsValue> {
    Ok(canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Failed to get 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()?)
}
