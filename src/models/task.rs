use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct Task {
    /// UUID to identify the task
    pub id: Uuid,
    /// Title of the task
    pub title: String,
    /// Longer free-text description
    pub description: String,
    /// Completion percentage, 0-100 by convention (not enforced here)
    pub progress: u8,
    /// Free-text category label, e.g. "Work"
    pub category: String,
    /// Due date as entered, e.g. "2026-03-01"
    pub due_date: Option<String>,
    /// Due time as entered, e.g. "14:30"
    pub time: Option<String>,
    /// People this task is assigned to
    pub assignees: Vec<String>,
    /// Checkbox-style child items
    pub subtasks: Vec<Subtask>,
    /// File records attached to the task
    pub files: Vec<FileAttachment>,
    /// When the task was created
    pub created_at: Timestamp,
    /// When the task or any of its nested collections last changed
    pub updated_at: Timestamp,
}

impl Task {
    /// Due date parsed into a calendar date, if present and well-formed.
    pub fn due_on(&self) -> Option<Date> {
        self.due_date.as_deref().and_then(|d| d.parse().ok())
    }

    pub fn is_completed(&self) -> bool {
        self.progress == 100
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Subtask {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
}

impl Subtask {
    /// A fresh, not-yet-completed subtask with a generated id.
    pub fn new(title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            completed: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct FileAttachment {
    /// File name, acts as the key for deletion within a task
    pub name: String,
    /// MIME type or free-form kind label
    #[serde(rename = "type")]
    pub kind: String,
    /// Where the file contents live, if anywhere
    pub url: Option<String>,
}

/// Everything a caller provides to create a task. Identity and
/// timestamps are generated by the store.
#[derive(Default, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub progress: u8,
    pub category: String,
    pub due_date: Option<String>,
    pub time: Option<String>,
    pub assignees: Vec<String>,
    pub subtasks: Vec<Subtask>,
    pub files: Vec<FileAttachment>,
}

/// Partial update for a task. `None` fields are left unchanged.
#[derive(Default, Clone)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub progress: Option<u8>,
    pub category: Option<String>,
    pub due_date: Option<String>,
    pub time: Option<String>,
    pub assignees: Option<Vec<String>>,
}

/// Partial update for a subtask. `None` fields are left unchanged.
#[derive(Default, Clone)]
pub struct SubtaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}
