use crate::error::{BoardError, Result};
use crate::geometry::{Point, Size};
use crate::state::{Edge, Task};
use log::debug;

/// Authoritative task and dependency collections. Tasks keep insertion order.
///
/// Removing a task does not touch edges; callers pair [`Board::remove_node`]
/// with [`Board::remove_edges_touching`]. Edges may reference missing tasks,
/// those are skipped wherever they are routed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Board {
    nodes: Vec<Task>,
    edges: Vec<Edge>,
}

/// Tasks and edges produced outside the engine, applied in one step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScriptedBatch {
    pub tasks: Vec<Task>,
    pub edges: Vec<Edge>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_nodes(&self) -> &[Task] {
        &self.nodes
    }

    pub fn list_edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn get_node(&self, id: &str) -> Option<&Task> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.get_node(id).is_some()
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges.iter().any(|e| e.from == from && e.to == to)
    }

    pub fn add_node(&mut self, mut node: Task) -> Result<()> {
        if self.contains_node(&node.id) {
            return Err(BoardError::DuplicateId { id: node.id });
        }
        node.position = node.position.clamp_non_negative();
        debug!("board: add task {}", node.id);
        self.nodes.push(node);
        Ok(())
    }

    /// Replaces the task with the same id in place, or appends it.
    pub fn upsert_node(&mut self, mut node: Task) {
        node.position = node.position.clamp_non_negative();
        match self.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    pub fn remove_node(&mut self, id: &str) -> Option<Task> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        debug!("board: remove task {}", id);
        Some(self.nodes.remove(index))
    }

    /// Alias of [`Board::remove_node`] under the name the editor uses.
    pub fn delete_node(&mut self, id: &str) -> Option<Task> {
        self.remove_node(id)
    }

    /// Returns the number of edges dropped.
    pub fn remove_edges_touching(&mut self, id: &str) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        before - self.edges.len()
    }

    /// Moves a task, clamping to non-negative coordinates. Returns `false`
    /// (nothing changed) when the task is missing or already at that position.
    pub fn update_node_position(&mut self, id: &str, position: Point) -> bool {
        let position = position.clamp_non_negative();
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) if node.position != position => {
                node.position = position;
                true
            }
            _ => false,
        }
    }

    /// Adds `from -> to`. Self-loops and duplicates are ignored; the ids are
    /// not checked against the task set.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        if from == to || self.has_edge(from, to) {
            return false;
        }
        debug!("board: add edge {} -> {}", from, to);
        self.edges.push(Edge::new(from, to));
        true
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| !(e.from == from && e.to == to));
        before != self.edges.len()
    }

    /// Mean of the task centers, if there are any tasks.
    pub fn centroid(&self, size: Size) -> Option<Point> {
        if self.nodes.is_empty() {
            return None;
        }
        let half = size.half();
        let sum = self
            .nodes
            .iter()
            .fold(Point::default(), |acc, n| acc.add(n.position.add(half)));
        let count = self.nodes.len() as f64;
        Some(Point::new(sum.x / count, sum.y / count))
    }

    /// Applies an externally generated batch. Tasks whose id already exists
    /// are skipped. Returns the number of tasks added.
    pub fn apply_batch(&mut self, batch: ScriptedBatch) -> usize {
        let mut added = 0;
        for task in batch.tasks {
            if self.add_node(task).is_ok() {
                added += 1;
            }
        }
        for edge in batch.edges {
            self.add_edge(&edge.from, &edge.to);
        }
        added
    }
}

/// Generates `T-<millis>-<counter>` ids.
#[derive(Clone, Debug, Default)]
pub struct TaskIdGenerator {
    counter: u64,
}

impl TaskIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, now_ms: f64) -> String {
        self.counter += 1;
        format!("T-{}-{}", now_ms.max(0.0) as u64, self.counter)
    }
}
