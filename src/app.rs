use crate::board::{Board, TaskIdGenerator};
use crate::canvas::{get_canvas_context, render_board};
use crate::components::{NodeEditor, ZoomControls};
use crate::config::{load_config, BoardConfig};
use crate::demo::{sample_board, scripted_analysis};
use crate::filter::{TaskFilter, VisibleSet};
use crate::geometry::{Point, Size};
use crate::gesture::{Command, GestureEngine, PointerInput, Scene};
use crate::state::{Edge, Task};
use crate::viewport::Viewport;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};
use web_sys::HtmlCanvasElement;

const MAX_ID_ATTEMPTS: usize = 8;
const NEW_TASK_TITLE: &str = "New task";

/// Shared board state, provided to child components.
#[derive(Clone, Copy)]
pub struct BoardCtx {
    pub config: BoardConfig,
    pub board: ReadSignal<Board>,
    pub set_board: WriteSignal<Board>,
    pub viewport: ReadSignal<Viewport>,
    pub set_viewport: WriteSignal<Viewport>,
    pub engine: ReadSignal<GestureEngine>,
    pub set_engine: WriteSignal<GestureEngine>,
    pub filter: ReadSignal<TaskFilter>,
    pub set_filter: WriteSignal<TaskFilter>,
    pub visible: Memo<VisibleSet>,
    pub editing_node: ReadSignal<Option<String>>,
    pub set_editing_node: WriteSignal<Option<String>>,
    pub ids: StoredValue<TaskIdGenerator>,
}

impl BoardCtx {
    /// Runs `f` against a consistent snapshot of what the gesture engine reads.
    fn with_scene<R>(&self, f: impl FnOnce(Scene) -> R) -> R {
        self.visible.with_untracked(|visible| {
            self.board.with_untracked(|board| {
                self.viewport.with_untracked(|viewport| f(Scene { board, viewport, visible }))
            })
        })
    }

    fn next_id(&self) -> String {
        let mut id = String::new();
        self.ids.update_value(|g| id = g.next_id(js_sys::Date::now()));
        id
    }

    /// Removes a task and every edge touching it.
    pub fn delete_task(&self, id: &str) {
        self.set_board.maybe_update(|b| {
            let removed = b.delete_node(id).is_some();
            let edges = b.remove_edges_touching(id);
            debug!("board: deleted {} ({} edges)", id, edges);
            removed || edges > 0
        });
        self.set_engine.maybe_update(|e| e.forget_task(id));
    }
}

fn measure(ctx: &BoardCtx, canvas: &HtmlCanvasElement) {
    let rect = canvas.get_bounding_client_rect();
    let origin = Point::new(rect.left(), rect.top());
    let size = Size::new(rect.width(), rect.height());
    ctx.set_viewport.maybe_update(|v| {
        if v.origin == origin && v.size == size {
            return false;
        }
        v.set_bounds(origin, size);
        true
    });
}

fn pointer_input(ev: &web_sys::PointerEvent) -> PointerInput {
    PointerInput::new(ev.pointer_id(), ev.client_x() as f64, ev.client_y() as f64).with_shift(ev.shift_key())
}

fn apply_commands(ctx: BoardCtx, commands: Vec<Command>) {
    for command in commands {
        match command {
            Command::MoveTask { .. } | Command::AddEdge { .. } => {
                ctx.set_board.maybe_update(|b| command.apply_to_board(b));
            }
            Command::ScrollTo(_) => {
                ctx.set_viewport.maybe_update(|v| command.apply_to_viewport(v));
            }
            Command::CreateTask { position } => create_task(ctx, position),
            Command::EditTask(id) => ctx.set_editing_node.set(Some(id)),
            Command::ConfirmEdgeRemoval(edge) => confirm_edge_removal(ctx, edge),
        }
    }
}

/// Adds a temporary task and opens the editor on it. A colliding id is
/// regenerated a bounded number of times.
fn create_task(ctx: BoardCtx, position: Point) {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = ctx.next_id();
        let mut task = Task::new(id.clone(), position.x, position.y, NEW_TASK_TITLE);
        task.temporary = true;

        let mut result = Ok(());
        ctx.set_board.maybe_update(|b| {
            result = b.add_node(task);
            result.is_ok()
        });
        match result {
            Ok(()) => {
                info!("board: created {}", id);
                ctx.set_engine.update(|e| e.select(Some(id.clone())));
                ctx.set_editing_node.set(Some(id));
                return;
            }
            Err(e) => debug!("board: {}; regenerating", e),
        }
    }
    warn!("board: gave up allocating a task id after {} attempts", MAX_ID_ATTEMPTS);
}

fn confirm_edge_removal(ctx: BoardCtx, edge: Edge) {
    let message = format!("Remove dependency {} -> {}?", edge.from, edge.to);
    let confirmed = web_sys::window()
        .and_then(|w| w.confirm_with_message(&message).ok())
        .unwrap_or(false);
    if confirmed {
        ctx.set_board.maybe_update(|b| b.remove_edge(&edge.from, &edge.to));
        info!("board: removed edge {} -> {}", edge.from, edge.to);
    }
}

fn run_analysis(ctx: BoardCtx) {
    let delay = ctx.config.analysis_delay_ms;
    info!("analysis: started ({} ms)", delay);
    spawn_local(async move {
        gloo_timers::future::TimeoutFuture::new(delay).await;
        let size = ctx.config.node_size();
        let batch = ctx.board.with_untracked(|b| scripted_analysis(b, size, || ctx.next_id()));
        let mut added = 0;
        ctx.set_board.maybe_update(|b| {
            added = b.apply_batch(batch);
            added > 0
        });
        info!("analysis: added {} tasks", added);
    });
}

#[component]
pub fn App() -> impl IntoView {
    let config = load_config();
    let (board, set_board) = signal(sample_board());
    let (viewport, set_viewport) = signal(Viewport::new(&config));
    let (engine, set_engine) = signal(GestureEngine::new(config));
    let (filter, set_filter) = signal(TaskFilter::default());
    let (editing_node, set_editing_node) = signal::<Option<String>>(None);
    let (cursor_style, set_cursor_style) = signal("grab");
    let visible = Memo::new(move |_| filter.with(|f| board.with(|b| f.visible_set(b))));
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let ctx = BoardCtx {
        config,
        board,
        set_board,
        viewport,
        set_viewport,
        engine,
        set_engine,
        filter,
        set_filter,
        visible,
        editing_node,
        set_editing_node,
        ids: StoredValue::new(TaskIdGenerator::new()),
    };
    provide_context(ctx);

    // First mount: measure and center on the tasks.
    Effect::new(move || {
        if let Some(canvas) = canvas_ref.get() {
            measure(&ctx, &canvas);
            let center = board
                .with_untracked(|b| b.centroid(config.node_size()))
                .unwrap_or_else(|| config.canvas_size().half());
            set_viewport.update(|v| v.center_on(center));
            info!("board: mounted, centered on ({:.0}, {:.0})", center.x, center.y);
        }
    });

    Effect::new(move || {
        let current_board = board.get();
        let current_viewport = viewport.get();
        let current_engine = engine.get();
        let current_visible = visible.get();
        let current_editing = editing_node.get();

        if let Some(canvas) = canvas_ref.get() {
            let canvas_el: &HtmlCanvasElement = &canvas;

            let rect = canvas_el.get_bounding_client_rect();
            let display_width = rect.width() as u32;
            let display_height = rect.height() as u32;

            if canvas_el.width() != display_width {
                canvas_el.set_width(display_width);
            }
            if canvas_el.height() != display_height {
                canvas_el.set_height(display_height);
            }

            if let Ok(context) = get_canvas_context(canvas_el) {
                render_board(
                    &context,
                    canvas_el,
                    &current_board,
                    &current_viewport,
                    &current_engine,
                    &current_visible,
                    current_editing.as_ref(),
                );
            }
        }
    });

    let on_pointer_down = move |ev: web_sys::PointerEvent| {
        if editing_node.get_untracked().is_some() || !ev.is_primary() {
            return;
        }
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let _ = canvas.focus();
        measure(&ctx, &canvas);

        let input = pointer_input(&ev);
        let mut commands = Vec::new();
        ctx.with_scene(|scene| set_engine.update(|e| commands = e.pointer_down(input, scene)));
        if !engine.with_untracked(|e| e.is_idle()) {
            let _ = canvas.set_pointer_capture(input.pointer_id);
        }
        set_cursor_style.set(ctx.with_scene(|scene| engine.with_untracked(|e| e.cursor_at(input.screen, scene))));
        apply_commands(ctx, commands);
    };

    let on_pointer_move = move |ev: web_sys::PointerEvent| {
        let input = pointer_input(&ev);
        if engine.with_untracked(|e| e.is_idle()) {
            let cursor = ctx.with_scene(|scene| engine.with_untracked(|e| e.cursor_at(input.screen, scene)));
            if cursor_style.get_untracked() != cursor {
                set_cursor_style.set(cursor);
            }
            return;
        }
        let mut commands = Vec::new();
        ctx.with_scene(|scene| set_engine.update(|e| commands = e.pointer_move(input, scene)));
        apply_commands(ctx, commands);
    };

    let on_pointer_up = move |ev: web_sys::PointerEvent| {
        let input = pointer_input(&ev);
        if let Some(canvas) = canvas_ref.get() {
            let _ = canvas.release_pointer_capture(input.pointer_id);
        }
        if engine.with_untracked(|e| e.is_idle()) {
            return;
        }
        let mut commands = Vec::new();
        ctx.with_scene(|scene| set_engine.update(|e| commands = e.pointer_up(input, scene)));
        apply_commands(ctx, commands);
        set_cursor_style.set(ctx.with_scene(|scene| engine.with_untracked(|e| e.cursor_at(input.screen, scene))));
    };

    let on_pointer_cancel = move |ev: web_sys::PointerEvent| {
        let pointer_id = ev.pointer_id();
        if engine.with_untracked(|e| e.is_idle()) {
            return;
        }
        set_engine.update(|e| e.pointer_cancel(pointer_id));
        set_cursor_style.set("grab");
    };

    let on_wheel = move |ev: web_sys::WheelEvent| {
        ev.prevent_default();
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        measure(&ctx, &canvas);

        let focus = Point::new(ev.client_x() as f64, ev.client_y() as f64);
        let factor = if ev.delta_y() < 0.0 {
            config.wheel_zoom_factor
        } else {
            1.0 / config.wheel_zoom_factor
        };
        set_viewport.maybe_update(|v| {
            let before = v.scale;
            v.zoom_about(focus, before * factor);
            v.scale != before
        });
    };

    let on_double_click = move |ev: web_sys::MouseEvent| {
        if editing_node.get_untracked().is_some() {
            return;
        }
        if let Some(canvas) = canvas_ref.get() {
            measure(&ctx, &canvas);
        }
        let screen = Point::new(ev.client_x() as f64, ev.client_y() as f64);
        let mut commands = Vec::new();
        ctx.with_scene(|scene| set_engine.update(|e| commands = e.double_click(screen, scene)));
        apply_commands(ctx, commands);
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if editing_node.get_untracked().is_some() {
            return;
        }

        match ev.key().as_str() {
            "Escape" => {
                set_engine.maybe_update(|e| e.cancel_link());
            }
            "Backspace" | "Delete" => {
                let selected = visible.with_untracked(|vis| {
                    engine.with_untracked(|e| e.visible_selection(vis).map(str::to_string))
                });
                if let Some(id) = selected {
                    ev.prevent_default();
                    ctx.delete_task(&id);
                }
            }
            "a" | "A" => run_analysis(ctx),
            _ => {}
        }
    };

    view! {
        <div style="width: 100vw; height: 100vh; overflow: hidden; background: #f9fafb; position: relative; touch-action: none;">
            <canvas
                node_ref=canvas_ref
                tabindex="0"
                style=move || format!("width: 100%; height: 100%; display: block; cursor: {}; outline: none;", cursor_style.get())
                on:pointerdown=on_pointer_down
                on:pointermove=on_pointer_move
                on:pointerup=on_pointer_up
                on:pointercancel=on_pointer_cancel
                on:wheel=on_wheel
                on:dblclick=on_double_click
                on:keydown=on_keydown
            />
            <NodeEditor />
            <ZoomControls />
            <div style="position: fixed; bottom: 12px; left: 12px; color: #4b5563; font-family: Inter, system-ui, sans-serif; font-size: 11px; letter-spacing: 0.3px;">
                "[DBLCLK] add/edit  [DRAG] move  [DRAG edge] link  [SHIFT+CLICK] link from selected  [DEL] delete  [A] analyze  [ESC] cancel"
            </div>
        </div>
    }
}
