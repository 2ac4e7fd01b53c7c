use jiff::civil::Date;
use thiserror::Error;

use crate::{
    models::{
        store::Store,
        task::{Task, TaskDraft, TaskPatch},
    },
    services::{ResolveTaskError, resolve_task},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum AddTaskError {
    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error("Task category cannot be empty")]
    EmptyCategory,

    #[error("Assignee '{0}' is listed more than once")]
    DuplicateAssignee(String),

    #[error("Invalid due date '{0}': {1}")]
    InvalidDueDate(String, String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddTaskParameters {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub due_date: Option<String>,
    pub time: Option<String>,
    pub assignees: Vec<String>,
    pub progress: u8,
}

pub fn add_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AddTaskParameters,
) -> Result<Task, AddTaskError> {
    // 1. Validate the fields the store itself will accept blindly
    let title = parameters.title.trim().to_string();
    if title.is_empty() {
        return Err(AddTaskError::EmptyTitle);
    }

    let category = parameters.category.trim().to_string();
    if category.is_empty() {
        return Err(AddTaskError::EmptyCategory);
    }

    // Assignee uniqueness is enforced here, not by the store
    let mut seen: Vec<&String> = Vec::new();
    for assignee in &parameters.assignees {
        if seen.contains(&assignee) {
            return Err(AddTaskError::DuplicateAssignee(assignee.clone()));
        }
        seen.push(assignee);
    }

    // Due dates stay text in the model, but a string that will never
    // match a calendar query is rejected up front
    if let Some(due) = &parameters.due_date {
        due.parse::<Date>()
            .map_err(|e| AddTaskError::InvalidDueDate(due.clone(), e.to_string()))?;
    }

    // 2. Hand the draft to the store, which generates id and timestamps
    let task_id = store.add_task(TaskDraft {
        title,
        description: parameters.description.unwrap_or_default(),
        progress: parameters.progress,
        category,
        due_date: parameters.due_date,
        time: parameters.time,
        assignees: parameters.assignees,
        ..TaskDraft::default()
    });

    // 3. Persist to storage
    storage.save(store)?;

    // 4. Return the created task
    Ok(store.get_task(task_id).unwrap().clone())
}

#[derive(Debug, Error)]
pub enum UpdateTaskError {
    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error("Task category cannot be empty")]
    EmptyCategory,

    #[error("Assignee '{0}' is listed more than once")]
    DuplicateAssignee(String),

    #[error("Invalid due date '{0}': {1}")]
    InvalidDueDate(String, String),

    #[error("No fields to update were provided")]
    NothingToUpdate,

    #[error(transparent)]
    Resolve(#[from] ResolveTaskError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Default)]
pub struct UpdateTaskParameters {
    pub task: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub progress: Option<u8>,
    pub category: Option<String>,
    pub due_date: Option<String>,
    pub time: Option<String>,
    /// Replaces the whole assignee list when provided
    pub assignees: Option<Vec<String>>,
}

pub fn update_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: UpdateTaskParameters,
) -> Result<Task, UpdateTaskError> {
    let title = match parameters.title {
        Some(title) => {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(UpdateTaskError::EmptyTitle);
            }
            Some(title)
        }
        None => None,
    };

    let category = match parameters.category {
        Some(category) => {
            let category = category.trim().to_string();
            if category.is_empty() {
                return Err(UpdateTaskError::EmptyCategory);
            }
            Some(category)
        }
        None => None,
    };

    if let Some(due) = &parameters.due_date {
        due.parse::<Date>()
            .map_err(|e| UpdateTaskError::InvalidDueDate(due.clone(), e.to_string()))?;
    }

    if let Some(assignees) = &parameters.assignees {
        let mut seen: Vec<&String> = Vec::new();
        for assignee in assignees {
            if seen.contains(&assignee) {
                return Err(UpdateTaskError::DuplicateAssignee(assignee.clone()));
            }
            seen.push(assignee);
        }
    }

    let patch = TaskPatch {
        title,
        description: parameters.description,
        progress: parameters.progress,
        category,
        due_date: parameters.due_date,
        time: parameters.time,
        assignees: parameters.assignees,
    };

    if patch.title.is_none()
        && patch.description.is_none()
        && patch.progress.is_none()
        && patch.category.is_none()
        && patch.due_date.is_none()
        && patch.time.is_none()
        && patch.assignees.is_none()
    {
        return Err(UpdateTaskError::NothingToUpdate);
    }

    let task_id = resolve_task(store, &parameters.task)?;
    store.update_task(task_id, patch);

    storage.save(store)?;

    store
        .get_task(task_id)
        .cloned()
        .ok_or_else(|| ResolveTaskError::TaskNotFound(parameters.task).into())
}

/// Marks a task as done. Completion is modeled as progress 100, the
/// same convention the dashboard counts by.
pub fn complete_task(
    store: &mut Store,
    storage: &impl Storage,
    reference: &str,
) -> Result<Task, UpdateTaskError> {
    set_progress(store, storage, reference, 100)
}

/// Puts a completed task back in play by resetting progress to 0.
pub fn reopen_task(
    store: &mut Store,
    storage: &impl Storage,
    reference: &str,
) -> Result<Task, UpdateTaskError> {
    set_progress(store, storage, reference, 0)
}

fn set_progress(
    store: &mut Store,
    storage: &impl Storage,
    reference: &str,
    progress: u8,
) -> Result<Task, UpdateTaskError> {
    let task_id = resolve_task(store, reference)?;
    store.update_task(
        task_id,
        TaskPatch {
            progress: Some(progress),
            ..TaskPatch::default()
        },
    );

    storage.save(store)?;

    store
        .get_task(task_id)
        .cloned()
        .ok_or_else(|| ResolveTaskError::TaskNotFound(reference.to_string()).into())
}

#[derive(Debug, Error)]
pub enum DeleteTaskError {
    #[error(transparent)]
    Resolve(#[from] ResolveTaskError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub fn delete_task(
    store: &mut Store,
    storage: &impl Storage,
    reference: &str,
) -> Result<Task, DeleteTaskError> {
    let task_id = resolve_task(store, reference)?;
    let deleted = store
        .get_task(task_id)
        .cloned()
        .ok_or_else(|| ResolveTaskError::TaskNotFound(reference.to_string()))?;

    store.delete_task(task_id);

    storage.save(store)?;

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullStorage;

    impl Storage for NullStorage {
        fn load(&self) -> Result<Store, StorageError> {
            Ok(Store::default())
        }

        fn save(&self, _store: &Store) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn params(title: &str, category: &str) -> AddTaskParameters {
        AddTaskParameters {
            title: title.to_string(),
            description: None,
            category: category.to_string(),
            due_date: None,
            time: None,
            assignees: vec![],
            progress: 0,
        }
    }

    #[test]
    fn test_add_task_rejects_blank_title() {
        let mut store = Store::default();
        let result = add_task(&mut store, &NullStorage, params("   ", "Work"));

        assert!(matches!(result, Err(AddTaskError::EmptyTitle)));
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn test_add_task_rejects_blank_category() {
        let mut store = Store::default();
        let result = add_task(&mut store, &NullStorage, params("Ship report", ""));

        assert!(matches!(result, Err(AddTaskError::EmptyCategory)));
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn test_add_task_rejects_duplicate_assignees() {
        let mut store = Store::default();
        let mut parameters = params("Ship report", "Work");
        parameters.assignees = vec![String::from("Alice"), String::from("Alice")];

        let result = add_task(&mut store, &NullStorage, parameters);

        match result {
            Err(AddTaskError::DuplicateAssignee(name)) => assert_eq!(name, "Alice"),
            _ => panic!("Expected DuplicateAssignee error"),
        }
    }

    #[test]
    fn test_add_task_rejects_malformed_due_date() {
        let mut store = Store::default();
        let mut parameters = params("Ship report", "Work");
        parameters.due_date = Some(String::from("next tuesday"));

        let result = add_task(&mut store, &NullStorage, parameters);

        assert!(matches!(result, Err(AddTaskError::InvalidDueDate(..))));
    }

    #[test]
    fn test_add_task_trims_title_and_category() {
        let mut store = Store::default();
        let task = add_task(&mut store, &NullStorage, params("  Ship report ", " Work "))
            .expect("Should add the task");

        assert_eq!(task.title, "Ship report");
        assert_eq!(task.category, "Work");
    }

    #[test]
    fn test_update_task_requires_some_field() {
        let mut store = Store::default();
        add_task(&mut store, &NullStorage, params("Ship report", "Work")).unwrap();

        let result = update_task(
            &mut store,
            &NullStorage,
            UpdateTaskParameters {
                task: String::from("ship"),
                ..UpdateTaskParameters::default()
            },
        );

        assert!(matches!(result, Err(UpdateTaskError::NothingToUpdate)));
    }

    #[test]
    fn test_complete_and_reopen_toggle_progress() {
        let mut store = Store::default();
        add_task(&mut store, &NullStorage, params("Ship report", "Work")).unwrap();

        let task = complete_task(&mut store, &NullStorage, "ship").unwrap();
        assert_eq!(task.progress, 100);

        let task = reopen_task(&mut store, &NullStorage, "ship").unwrap();
        assert_eq!(task.progress, 0);
    }

    #[test]
    fn test_delete_task_returns_the_removed_task() {
        let mut store = Store::default();
        add_task(&mut store, &NullStorage, params("Ship report", "Work")).unwrap();

        let deleted = delete_task(&mut store, &NullStorage, "ship").unwrap();
        assert_eq!(deleted.title, "Ship report");
        assert!(store.tasks.is_empty());
    }

    #[test]
    fn test_delete_unknown_task_fails() {
        let mut store = Store::default();
        let result = delete_task(&mut store, &NullStorage, "ghost");

        assert!(matches!(
            result,
            Err(DeleteTaskError::Resolve(ResolveTaskError::TaskNotFound(_)))
        ));
    }
}
