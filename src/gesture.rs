//! Pointer gesture state machine for the board.
//!
//! One gesture is active at a time and it is bound to the pointer that
//! started it. Handlers only read the board and viewport; mutations come
//! back as [`Command`]s for the caller to apply.

use crate::board::Board;
use crate::config::BoardConfig;
use crate::filter::VisibleSet;
use crate::geometry::{connector_between, connector_path, Bezier, Point, Rect, Side, Size};
use crate::state::{Edge, Task};
use crate::viewport::Viewport;
use log::debug;
use std::collections::HashMap;

pub type PointerId = i32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    pub pointer_id: PointerId,
    /// Client (screen) coordinates.
    pub screen: Point,
    pub shift: bool,
}

impl PointerInput {
    pub fn new(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            screen: Point::new(x, y),
            shift: false,
        }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }
}

/// What the gesture handlers read on every event.
#[derive(Clone, Copy)]
pub struct Scene<'a> {
    pub board: &'a Board,
    pub viewport: &'a Viewport,
    pub visible: &'a VisibleSet,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkTarget {
    pub node_id: String,
    /// False when the edge already exists.
    pub valid: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkGesture {
    pub pointer_id: PointerId,
    pub from: String,
    pub side: Side,
    /// Fixed source point of the transient curve.
    pub anchor: Point,
    /// Live pointer position in canvas space.
    pub pointer: Point,
    pub hover: Option<LinkTarget>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Panning {
        pointer_id: PointerId,
        start_pointer: Point,
        start_scroll: Point,
    },
    Dragging {
        pointer_id: PointerId,
        node_id: String,
        /// Pointer position relative to the task's top-left at pointer-down.
        pointer_offset: Point,
        candidate: Point,
    },
    Linking(LinkGesture),
}

impl Gesture {
    fn pointer_id(&self) -> Option<PointerId> {
        match self {
            Gesture::Idle => None,
            Gesture::Panning { pointer_id, .. } | Gesture::Dragging { pointer_id, .. } => Some(*pointer_id),
            Gesture::Linking(link) => Some(link.pointer_id),
        }
    }
}

/// Mutations requested by the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    MoveTask { id: String, position: Point },
    AddEdge { from: String, to: String },
    ScrollTo(Point),
    /// New task whose top-left is `position`; the caller assigns the id.
    CreateTask { position: Point },
    EditTask(String),
    /// A connector was clicked; removal waits for the user's confirmation.
    ConfirmEdgeRemoval(Edge),
}

impl Command {
    /// Returns whether the board changed. Commands that are not board
    /// mutations leave it untouched.
    pub fn apply_to_board(&self, board: &mut Board) -> bool {
        match self {
            Command::MoveTask { id, position } => board.update_node_position(id, *position),
            Command::AddEdge { from, to } => board.add_edge(from, to),
            _ => false,
        }
    }

    pub fn apply_to_viewport(&self, viewport: &mut Viewport) -> bool {
        match self {
            Command::ScrollTo(scroll) => {
                let before = viewport.scroll;
                viewport.scroll_to(*scroll);
                viewport.scroll != before
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureEngine {
    config: BoardConfig,
    gesture: Gesture,
    /// Rendering-only deltas for tasks being dragged.
    offsets: HashMap<String, Point>,
    selected: Option<String>,
}

impl GestureEngine {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            gesture: Gesture::Idle,
            offsets: HashMap::new(),
            selected: None,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selected = id;
    }

    /// The selection, unless the filter currently hides it.
    pub fn visible_selection(&self, visible: &VisibleSet) -> Option<&str> {
        self.selected().filter(|id| visible.contains(id))
    }

    /// A task left the board: drop the selection and any gesture that
    /// refers to it. Returns whether anything changed.
    pub fn forget_task(&mut self, id: &str) -> bool {
        let mut changed = false;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
            changed = true;
        }
        let stale = match &self.gesture {
            Gesture::Dragging { node_id, .. } => node_id == id,
            Gesture::Linking(link) => link.from == id,
            Gesture::Idle | Gesture::Panning { .. } => false,
        };
        if stale {
            debug!("gesture: {} removed mid-gesture", id);
            self.gesture = Gesture::Idle;
            self.offsets.clear();
            changed = true;
        } else if let Gesture::Linking(link) = &mut self.gesture {
            if link.hover.as_ref().is_some_and(|h| h.node_id == id) {
                link.hover = None;
                changed = true;
            }
        }
        changed
    }

    pub fn is_dragging(&self, id: &str) -> bool {
        matches!(&self.gesture, Gesture::Dragging { node_id, .. } if node_id == id)
    }

    pub fn temporary_offset(&self, id: &str) -> Option<Point> {
        self.offsets.get(id).copied()
    }

    /// Committed position plus any in-flight drag offset.
    pub fn rendered_position(&self, task: &Task) -> Point {
        match self.offsets.get(&task.id) {
            Some(delta) => task.position.add(*delta),
            None => task.position,
        }
    }

    /// Rectangle of a rendered task, `None` when it is missing or filtered out.
    pub fn node_rect(&self, board: &Board, visible: &VisibleSet, id: &str) -> Option<Rect> {
        if !visible.contains(id) {
            return None;
        }
        board
            .get_node(id)
            .map(|task| Rect::new(self.rendered_position(task), self.config.node_size()))
    }

    /// Connector for a committed edge. Dangling or hidden endpoints route to nothing.
    pub fn route(&self, board: &Board, visible: &VisibleSet, edge: &Edge) -> Option<Bezier> {
        connector_path(
            self.node_rect(board, visible, &edge.from),
            self.node_rect(board, visible, &edge.to),
        )
    }

    /// Topmost rendered task containing the canvas point.
    pub fn task_at<'b>(&self, board: &'b Board, visible: &VisibleSet, p: Point) -> Option<&'b Task> {
        board
            .list_nodes()
            .iter()
            .rev()
            .filter(|t| visible.contains(&t.id))
            .find(|t| Rect::new(self.rendered_position(t), self.config.node_size()).contains(p))
    }

    /// First rendered connector whose hit stroke covers the canvas point.
    pub fn edge_at<'b>(&self, board: &'b Board, visible: &VisibleSet, p: Point) -> Option<&'b Edge> {
        let width = self.config.connector_hit_width;
        board
            .list_edges()
            .iter()
            .find(|e| self.route(board, visible, e).is_some_and(|path| path.hit(p, width)))
    }

    pub fn link(&self) -> Option<&LinkGesture> {
        match &self.gesture {
            Gesture::Linking(link) => Some(link),
            _ => None,
        }
    }

    /// Transient curve from the link anchor to the pointer.
    pub fn link_preview(&self) -> Option<Bezier> {
        self.link().map(|link| connector_between(link.anchor, link.pointer))
    }

    fn owns(&self, input: &PointerInput) -> bool {
        self.gesture.pointer_id() == Some(input.pointer_id)
    }

    pub fn pointer_down(&mut self, input: PointerInput, scene: Scene) -> Vec<Command> {
        if !self.is_idle() {
            debug!("gesture: ignoring pointer {} while busy", input.pointer_id);
            return Vec::new();
        }
        let canvas = scene.viewport.screen_to_canvas(input.screen);

        if let Some(task) = self.task_at(scene.board, scene.visible, canvas) {
            if input.shift {
                let from = self.visible_selection(scene.visible).map(str::to_string);
                if let Some(from) = from.filter(|s| *s != task.id) {
                    self.selected = Some(task.id.clone());
                    if scene.board.has_edge(&from, &task.id) {
                        return Vec::new();
                    }
                    debug!("gesture: shift-click link {} -> {}", from, task.id);
                    return vec![Command::AddEdge { from, to: task.id.clone() }];
                }
            }
            self.selected = Some(task.id.clone());

            let local_x = canvas.x - task.position.x;
            let rect = task.rect(self.config.node_size());
            self.gesture = match rect.handle_side(local_x, self.config.handle_zone) {
                Some(side) => {
                    debug!("gesture: link from {} ({:?})", task.id, side);
                    Gesture::Linking(LinkGesture {
                        pointer_id: input.pointer_id,
                        from: task.id.clone(),
                        side,
                        anchor: rect.anchor(side),
                        pointer: canvas,
                        hover: None,
                    })
                }
                None => {
                    debug!("gesture: drag {}", task.id);
                    Gesture::Dragging {
                        pointer_id: input.pointer_id,
                        node_id: task.id.clone(),
                        pointer_offset: canvas.sub(task.position),
                        candidate: task.position,
                    }
                }
            };
            return Vec::new();
        }

        self.selected = None;
        if let Some(edge) = self.edge_at(scene.board, scene.visible, canvas) {
            return vec![Command::ConfirmEdgeRemoval(edge.clone())];
        }

        debug!("gesture: pan");
        self.gesture = Gesture::Panning {
            pointer_id: input.pointer_id,
            start_pointer: input.screen,
            start_scroll: scene.viewport.scroll,
        };
        Vec::new()
    }

    pub fn pointer_move(&mut self, input: PointerInput, scene: Scene) -> Vec<Command> {
        if !self.owns(&input) {
            return Vec::new();
        }
        let canvas = scene.viewport.screen_to_canvas(input.screen);
        let size = self.config.node_size();

        match &mut self.gesture {
            Gesture::Idle => Vec::new(),
            Gesture::Panning { start_pointer, start_scroll, .. } => {
                let moved = input.screen.sub(*start_pointer);
                vec![Command::ScrollTo(start_scroll.sub(moved).clamp_non_negative())]
            }
            Gesture::Dragging {
                node_id,
                pointer_offset,
                candidate,
                ..
            } => {
                *candidate = canvas.sub(*pointer_offset).clamp_non_negative();
                if let Some(task) = scene.board.get_node(node_id) {
                    self.offsets.insert(node_id.clone(), candidate.sub(task.position));
                }
                Vec::new()
            }
            Gesture::Linking(link) => {
                link.pointer = canvas;
                link.hover = hover_target(scene, &link.from, canvas, size);
                Vec::new()
            }
        }
    }

    pub fn pointer_up(&mut self, input: PointerInput, scene: Scene) -> Vec<Command> {
        if !self.owns(&input) {
            return Vec::new();
        }
        let commands = self.pointer_move(input, scene);
        let finished = std::mem::take(&mut self.gesture);
        self.offsets.clear();

        match finished {
            Gesture::Idle => Vec::new(),
            Gesture::Panning { .. } => commands,
            Gesture::Dragging { node_id, candidate, .. } if scene.board.contains_node(&node_id) => {
                debug!("gesture: drop {} at ({}, {})", node_id, candidate.x, candidate.y);
                vec![Command::MoveTask {
                    id: node_id,
                    position: candidate,
                }]
            }
            Gesture::Dragging { node_id, .. } => {
                debug!("gesture: dragged {} no longer exists", node_id);
                Vec::new()
            }
            Gesture::Linking(link) => match link.hover {
                Some(LinkTarget { node_id, valid: true }) if scene.board.contains_node(&link.from) => {
                    debug!("gesture: link {} -> {}", link.from, node_id);
                    vec![Command::AddEdge {
                        from: link.from,
                        to: node_id,
                    }]
                }
                _ => {
                    debug!("gesture: link from {} discarded", link.from);
                    Vec::new()
                }
            },
        }
    }

    /// Browser took the pointer away: abandon the gesture without committing.
    pub fn pointer_cancel(&mut self, pointer_id: PointerId) {
        if self.gesture.pointer_id() == Some(pointer_id) {
            debug!("gesture: pointer {} cancelled", pointer_id);
            self.gesture = Gesture::Idle;
            self.offsets.clear();
        }
    }

    /// Escape: clears an in-flight link. Drags and pans are not affected.
    pub fn cancel_link(&mut self) -> bool {
        if self.link().is_some() {
            debug!("gesture: link cancelled");
            self.gesture = Gesture::Idle;
            true
        } else {
            false
        }
    }

    pub fn double_click(&mut self, screen: Point, scene: Scene) -> Vec<Command> {
        if !self.is_idle() {
            return Vec::new();
        }
        let canvas = scene.viewport.screen_to_canvas(screen);
        if let Some(task) = self.task_at(scene.board, scene.visible, canvas) {
            return vec![Command::EditTask(task.id.clone())];
        }
        if self.edge_at(scene.board, scene.visible, canvas).is_some() {
            return Vec::new();
        }
        let position = canvas.sub(self.config.new_task_offset()).clamp_non_negative();
        vec![Command::CreateTask { position }]
    }

    /// CSS cursor for the pointer at `screen`.
    pub fn cursor_at(&self, screen: Point, scene: Scene) -> &'static str {
        match &self.gesture {
            Gesture::Panning { .. } => return "grabbing",
            Gesture::Dragging { .. } => return "move",
            Gesture::Linking(_) => return "crosshair",
            Gesture::Idle => {}
        }
        let canvas = scene.viewport.screen_to_canvas(screen);
        if let Some(task) = self.task_at(scene.board, scene.visible, canvas) {
            let rect = task.rect(self.config.node_size());
            return match rect.handle_side(canvas.x - task.position.x, self.config.handle_zone) {
                Some(_) => "crosshair",
                None => "move",
            };
        }
        if self.edge_at(scene.board, scene.visible, canvas).is_some() {
            "pointer"
        } else {
            "grab"
        }
    }
}

/// Task under `p` other than the link source, with whether linking to it is allowed.
fn hover_target(scene: Scene, from: &str, p: Point, size: Size) -> Option<LinkTarget> {
    scene
        .board
        .list_nodes()
        .iter()
        .rev()
        .filter(|t| t.id != from && scene.visible.contains(&t.id))
        .find(|t| t.rect(size).contains(p))
        .map(|t| LinkTarget {
            node_id: t.id.clone(),
            valid: !scene.board.has_edge(from, &t.id),
        })
}
