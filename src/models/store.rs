use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::task::{FileAttachment, Subtask, SubtaskPatch, Task, TaskDraft, TaskPatch};

/// Current schema version
pub const CURRENT_VERSION: u32 = 1;

/// Single source of truth for all task data. Every view reads from
/// here and every mutation goes through the operations below; callers
/// never touch `tasks` directly except for read-only iteration.
///
/// Mutations on ids that no longer exist are silent no-ops. The store
/// performs no input validation, that is a caller concern.
#[derive(Serialize, Deserialize)]
pub struct Store {
    pub version: u32,
    /// Task collection, newest-first
    pub tasks: Vec<Task>,
    /// Task currently shown in detail view. A by-value copy of a
    /// collection entry, never persisted; reconcile by id against
    /// `tasks` when live data is needed.
    #[serde(skip)]
    pub selected_task: Option<Task>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            tasks: vec![],
            selected_task: None,
        }
    }
}

/// Counts behind the dashboard header
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

impl Store {
    /// Creates a task from `draft`, generating its identity and
    /// timestamps, and prepends it so the collection stays
    /// newest-first. Returns the generated id.
    pub fn add_task(&mut self, draft: TaskDraft) -> Uuid {
        let now = Timestamp::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            progress: draft.progress,
            category: draft.category,
            due_date: draft.due_date,
            time: draft.time,
            assignees: draft.assignees,
            subtasks: draft.subtasks,
            files: draft.files,
            created_at: now,
            updated_at: now,
        };
        let id = task.id;
        self.tasks.insert(0, task);
        id
    }

    /// Merges the provided fields into the matching task and refreshes
    /// its `updated_at`.
    pub fn update_task(&mut self, id: Uuid, patch: TaskPatch) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            if let Some(title) = patch.title {
                task.title = title;
            }
            if let Some(description) = patch.description {
                task.description = description;
            }
            if let Some(progress) = patch.progress {
                task.progress = progress;
            }
            if let Some(category) = patch.category {
                task.category = category;
            }
            if let Some(due_date) = patch.due_date {
                task.due_date = Some(due_date);
            }
            if let Some(time) = patch.time {
                task.time = Some(time);
            }
            if let Some(assignees) = patch.assignees {
                task.assignees = assignees;
            }
            task.updated_at = Timestamp::now();
        }
    }

    /// Removes the matching task. Clears the selection pointer when it
    /// referenced the removed task.
    pub fn delete_task(&mut self, id: Uuid) {
        self.tasks.retain(|t| t.id != id);
        if self.selected_task.as_ref().is_some_and(|t| t.id == id) {
            self.selected_task = None;
        }
    }

    /// Replaces the selection pointer unconditionally.
    pub fn set_selected_task(&mut self, task: Option<Task>) {
        self.selected_task = task;
    }

    /// Appends a new, not-yet-completed subtask with a generated id.
    pub fn add_subtask(&mut self, task_id: Uuid, title: String) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.subtasks.push(Subtask::new(title));
            task.updated_at = Timestamp::now();
        }
    }

    /// Merges the provided fields into the matching subtask and
    /// refreshes the parent's `updated_at`.
    pub fn update_subtask(&mut self, task_id: Uuid, subtask_id: Uuid, patch: SubtaskPatch) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id)
            && let Some(subtask) = task.subtasks.iter_mut().find(|s| s.id == subtask_id)
        {
            if let Some(title) = patch.title {
                subtask.title = title;
            }
            if let Some(completed) = patch.completed {
                subtask.completed = completed;
            }
            task.updated_at = Timestamp::now();
        }
    }

    /// Removes the matching subtask and refreshes the parent's
    /// `updated_at`.
    pub fn delete_subtask(&mut self, task_id: Uuid, subtask_id: Uuid) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id)
            && task.subtasks.iter().any(|s| s.id == subtask_id)
        {
            task.subtasks.retain(|s| s.id != subtask_id);
            task.updated_at = Timestamp::now();
        }
    }

    /// Appends a file record. Duplicate names are accepted, deletion
    /// keys on name and removes every match.
    pub fn add_file(&mut self, task_id: Uuid, file: FileAttachment) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.files.push(file);
            task.updated_at = Timestamp::now();
        }
    }

    /// Removes every file record with the given name from the matching
    /// task. No-op when nothing matches.
    pub fn delete_file(&mut self, task_id: Uuid, name: &str) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id)
            && task.files.iter().any(|f| f.name == name)
        {
            task.files.retain(|f| f.name != name);
            task.updated_at = Timestamp::now();
        }
    }

    pub fn get_task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// All tasks when `category` is `None`, the exact-match subset
    /// otherwise. Returns fresh clones the caller may hold onto.
    pub fn tasks_by_category(&self, category: Option<&str>) -> Vec<Task> {
        match category {
            None => self.tasks.clone(),
            Some(c) => self
                .tasks
                .iter()
                .filter(|t| t.category == c)
                .cloned()
                .collect(),
        }
    }

    /// Tasks whose due date falls on `date`. Tasks without a parseable
    /// due date are excluded.
    pub fn tasks_by_date(&self, date: Date) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.due_on() == Some(date))
            .cloned()
            .collect()
    }

    /// Distinct categories in order of first appearance. Derived from
    /// the task collection on demand, never stored separately.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for task in &self.tasks {
            if !seen.contains(&task.category) {
                seen.push(task.category.clone());
            }
        }
        seen
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats {
            total: self.tasks.len(),
            completed: self.tasks.iter().filter(|t| t.progress == 100).count(),
            in_progress: self
                .tasks
                .iter()
                .filter(|t| t.progress > 0 && t.progress < 100)
                .count(),
        }
    }
}
