use crate::board::{Board, ScriptedBatch};
use crate::geometry::Size;
use crate::state::{Axis, Edge, Priority, Status, Task, TaskDetails};

const ANALYSIS_TITLES: [&str; 3] = ["Risk review", "Resource check", "Schedule buffer"];
const ANALYSIS_GAP: f64 = 80.0;

pub fn axes() -> Vec<Axis> {
    [
        ("AX-01", "Experimental methods", "#3b82f6"),
        ("AX-02", "Field collection", "#10b981"),
        ("AX-03", "Analysis & publication", "#f59e0b"),
    ]
    .into_iter()
    .map(|(id, name, color)| Axis {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
    })
    .collect()
}

pub fn axis_color(axis_id: &str) -> String {
    axes()
        .into_iter()
        .find(|a| a.id == axis_id)
        .map(|a| a.color)
        .unwrap_or_else(|| "#000000".to_string())
}

fn task(
    id: &str,
    axis: &str,
    title: &str,
    status: Status,
    priority: Priority,
    assignee: &str,
    due: &str,
    (x, y): (f64, f64),
) -> Task {
    let mut task = Task::new(id, x, y, title);
    task.details = TaskDetails {
        title: title.to_string(),
        axis_id: axis.to_string(),
        status,
        priority,
        assignee: Some(assignee.to_string()),
        due: Some(due.to_string()),
        ..TaskDetails::default()
    };
    task
}

/// Plan shown on first load.
pub fn sample_board() -> Board {
    use Priority::*;
    use Status::*;

    let tasks = [
        task("T-003", "AX-01", "Validate requirements", Done, Medium, "J. Martin", "2025-11-06", (100.0, 240.0)),
        task("T-007", "AX-01", "Write experimental protocol", ToDo, High, "A. Leroy", "2025-11-18", (620.0, 160.0)),
        task("T-009", "AX-01", "Order reagents", Doing, Medium, "P. Diallo", "2025-11-12", (1140.0, 160.0)),
        task("T-012", "AX-02", "Clean data V1", ToDo, Medium, "K. Dupont", "2025-12-05", (100.0, 420.0)),
        task("T-015", "AX-03", "Preliminary statistics", Draft, High, "M. Silva", "2025-12-12", (620.0, 420.0)),
        task("T-018", "AX-03", "Draft preprint", Draft, Critical, "C. Bernard", "2025-12-20", (1140.0, 420.0)),
        task("T-021", "AX-03", "Submission", ToDo, Medium, "Team", "2026-01-10", (1660.0, 420.0)),
    ];

    let mut board = Board::new();
    for t in tasks {
        board.upsert_node(t);
    }
    for (from, to) in [
        ("T-003", "T-007"),
        ("T-007", "T-009"),
        ("T-012", "T-015"),
        ("T-015", "T-018"),
        ("T-018", "T-021"),
    ] {
        board.add_edge(from, to);
    }
    board
}

/// Canned "analysis": three follow-up tasks chained in order. A task whose
/// title already exists on the board is reused instead of duplicated. New
/// tasks are placed in a row to the right of the rightmost task.
pub fn scripted_analysis(board: &Board, size: Size, mut next_id: impl FnMut() -> String) -> ScriptedBatch {
    let right = board
        .list_nodes()
        .iter()
        .map(|t| t.position.x + size.width)
        .fold(0.0_f64, f64::max);
    let y = board.list_nodes().last().map(|t| t.position.y).unwrap_or(0.0);

    let mut batch = ScriptedBatch::default();
    let mut chain = Vec::with_capacity(ANALYSIS_TITLES.len());
    let mut x = right + ANALYSIS_GAP;

    for title in ANALYSIS_TITLES {
        let existing = board.list_nodes().iter().find(|t| t.details.title == title);
        let id = match existing {
            Some(t) => t.id.clone(),
            None => {
                let mut t = Task::new(next_id(), x, y, title);
                t.details.status = Status::Draft;
                x += size.width + ANALYSIS_GAP;
                let id = t.id.clone();
                batch.tasks.push(t);
                id
            }
        };
        chain.push(id);
    }

    batch.edges = chain.windows(2).map(|pair| Edge::new(&pair[0], &pair[1])).collect();
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size() -> Size {
        Size::new(420.0, 64.0)
    }

    fn ids() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("AI-{}", n)
        }
    }

    #[test]
    fn sample_board_is_consistent() {
        let board = sample_board();
        assert_eq!(board.list_nodes().len(), 7);
        assert_eq!(board.list_edges().len(), 5);
        for edge in board.list_edges() {
            assert!(board.contains_node(&edge.from));
            assert!(board.contains_node(&edge.to));
        }
        let axis_ids: Vec<_> = axes().into_iter().map(|a| a.id).collect();
        assert!(board.list_nodes().iter().all(|t| axis_ids.contains(&t.details.axis_id)));
    }

    #[test]
    fn unknown_axis_is_black() {
        assert_eq!(axis_color("AX-02"), "#10b981");
        assert_eq!(axis_color("AX-99"), "#000000");
    }

    #[test]
    fn analysis_appends_chain_right_of_board() {
        let mut board = sample_board();
        let batch = scripted_analysis(&board, size(), ids());
        assert_eq!(batch.tasks.len(), 3);
        assert_eq!(batch.tasks[0].position.x, 1660.0 + 420.0 + 80.0);
        assert_eq!(batch.edges, vec![Edge::new("AI-1", "AI-2"), Edge::new("AI-2", "AI-3")]);

        assert_eq!(board.apply_batch(batch), 3);
        assert_eq!(board.list_nodes().len(), 10);
        assert!(board.has_edge("AI-1", "AI-2"));
    }

    #[test]
    fn analysis_reuses_same_titled_tasks() {
        let mut board = Board::new();
        board.add_node(Task::new("R", 0.0, 0.0, "Resource check")).unwrap();
        let batch = scripted_analysis(&board, size(), ids());
        let titles: Vec<_> = batch.tasks.iter().map(|t| t.details.title.as_str()).collect();
        assert_eq!(titles, vec!["Risk review", "Schedule buffer"]);
        assert_eq!(batch.edges, vec![Edge::new("AI-1", "R"), Edge::new("R", "AI-2")]);
    }

    #[test]
    fn analysis_on_empty_board_starts_near_origin() {
        let batch = scripted_analysis(&Board::new(), size(), ids());
        assert_eq!(batch.tasks[0].position.x, 80.0);
        assert_eq!(batch.tasks[0].position.y, 0.0);
    }

    #[test]
    fn second_run_adds_nothing_new() {
        let mut board = sample_board();
        let mut next = ids();
        let first = scripted_analysis(&board, size(), &mut next);
        board.apply_batch(first);
        let second = scripted_analysis(&board, size(), &mut next);
        assert!(second.tasks.is_empty());
        assert_eq!(board.apply_batch(second), 0);
        assert_eq!(board.list_edges().len(), 7);
    }
}
