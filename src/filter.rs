use crate::board::Board;
use crate::state::{Edge, Priority, Status, Task};
use std::collections::HashSet;

/// Predicate over task attributes, owned by the toolbar and legend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub axis: Option<String>,
    pub search: String,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.axis.is_none() && self.search.trim().is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        let d = &task.details;
        if self.status.is_some_and(|s| s != d.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != d.priority) {
            return false;
        }
        if self.axis.as_ref().is_some_and(|a| *a != d.axis_id) {
            return false;
        }
        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        d.title.to_lowercase().contains(&query)
            || task.id.to_lowercase().contains(&query)
            || d.assignee.as_deref().is_some_and(|a| a.to_lowercase().contains(&query))
    }

    pub fn visible_set(&self, board: &Board) -> VisibleSet {
        VisibleSet {
            ids: board
                .list_nodes()
                .iter()
                .filter(|t| self.matches(t))
                .map(|t| t.id.clone())
                .collect(),
        }
    }
}

/// Ids of the tasks currently rendered. Anything outside the set is neither
/// drawn nor hit-tested; the board itself is untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibleSet {
    ids: HashSet<String>,
}

impl VisibleSet {
    pub fn all(board: &Board) -> Self {
        Self {
            ids: board.list_nodes().iter().map(|t| t.id.clone()).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// An edge is shown only when both endpoints are.
    pub fn shows_edge(&self, edge: &Edge) -> bool {
        self.contains(&edge.from) && self.contains(&edge.to)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<String> for VisibleSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Board {
        let mut board = Board::new();
        let mut a = Task::new("T-1", 0.0, 0.0, "Order reagents");
        a.details.status = Status::Doing;
        a.details.axis_id = "AX-01".to_string();
        a.details.assignee = Some("P. Diallo".to_string());
        let mut b = Task::new("T-2", 500.0, 0.0, "Draft preprint");
        b.details.status = Status::Draft;
        b.details.priority = Priority::Critical;
        b.details.axis_id = "AX-03".to_string();
        board.add_node(a).unwrap();
        board.add_node(b).unwrap();
        board.add_edge("T-1", "T-2");
        board
    }

    #[test]
    fn empty_filter_shows_everything() {
        let board = sample();
        let filter = TaskFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.visible_set(&board), VisibleSet::all(&board));
    }

    #[test]
    fn status_and_priority_narrow() {
        let board = sample();
        let filter = TaskFilter {
            priority: Some(Priority::Critical),
            ..TaskFilter::default()
        };
        let visible = filter.visible_set(&board);
        assert!(visible.contains("T-2"));
        assert!(!visible.contains("T-1"));

        let filter = TaskFilter {
            status: Some(Status::Done),
            ..TaskFilter::default()
        };
        assert!(filter.visible_set(&board).is_empty());
    }

    #[test]
    fn axis_filter() {
        let board = sample();
        let filter = TaskFilter {
            axis: Some("AX-01".to_string()),
            ..TaskFilter::default()
        };
        let visible = filter.visible_set(&board);
        assert_eq!(visible.len(), 1);
        assert!(visible.contains("T-1"));
    }

    #[test]
    fn search_is_case_insensitive_over_title_id_assignee() {
        let board = sample();
        let search = |q: &str| {
            TaskFilter {
                search: q.to_string(),
                ..TaskFilter::default()
            }
            .visible_set(&board)
        };
        assert!(search("REAGENT").contains("T-1"));
        assert!(search("t-2").contains("T-2"));
        assert!(search("diallo").contains("T-1"));
        assert!(search("nothing here").is_empty());
    }

    #[test]
    fn edge_hidden_when_endpoint_filtered() {
        let board = sample();
        let edge = &board.list_edges()[0];
        assert!(VisibleSet::all(&board).shows_edge(edge));
        let only_target: VisibleSet = ["T-2".to_string()].into_iter().collect();
        assert!(!only_target.shows_edge(edge));
    }

    #[test]
    fn filtering_does_not_mutate_board() {
        let board = sample();
        let before = board.clone();
        let _ = TaskFilter {
            search: "x".to_string(),
            ..TaskFilter::default()
        }
        .visible_set(&board);
        assert_eq!(board, before);
    }
}
