use crate::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Draft,
    #[default]
    ToDo,
    Doing,
    Done,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::Draft, Status::ToDo, Status::Doing, Status::Done];

    pub fn label(self) -> &'static str {
        match self {
            Status::Draft => "DRAFT",
            Status::ToDo => "TO-DO",
            Status::Doing => "DOING",
            Status::Done => "DONE",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Critical];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MED",
            Priority::High => "HIGH",
            Priority::Critical => "CRIT",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

/// Domain attributes carried with a task. The interaction engine never reads
/// these; rendering and filtering do.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TaskDetails {
    pub title: String,
    #[serde(default)]
    pub axis_id: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl TaskDetails {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// First letter of each word of the assignee, or `?`.
    pub fn initials(&self) -> String {
        let initials: String = self
            .assignee
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Task {
    pub id: String,
    /// Top-left corner in canvas units.
    pub position: Point,
    #[serde(default)]
    pub temporary: bool,
    #[serde(flatten)]
    pub details: TaskDetails,
}

impl Task {
    pub fn new(id: impl Into<String>, x: f64, y: f64, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: Point::new(x, y),
            temporary: false,
            details: TaskDetails::titled(title),
        }
    }

    pub fn rect(&self, size: Size) -> Rect {
        Rect::new(self.position, size)
    }
}

/// `from` must complete before `to`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Axis {
    pub id: String,
    pub name: String,
    pub color: String,
}
