use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        store::Store,
        task::{SubtaskPatch, Task},
    },
    services::{ResolveTaskError, resolve_task},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum SubtaskError {
    #[error("Subtask title cannot be empty")]
    EmptyTitle,

    #[error("Subtask '{0}' not found")]
    SubtaskNotFound(String),

    #[error("Subtask reference is ambiguous. Multiple subtasks found: {}", .0.join(", "))]
    AmbiguousSubtask(Vec<String>),

    #[error(transparent)]
    Task(#[from] ResolveTaskError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Subtasks are referenced by their 1-based position in the detail
/// view, or by a fragment of their title.
fn resolve_subtask(task: &Task, reference: &str) -> Result<Uuid, SubtaskError> {
    if let Ok(position) = reference.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| task.subtasks.get(index))
            .map(|subtask| subtask.id)
            .ok_or_else(|| SubtaskError::SubtaskNotFound(reference.to_string()));
    }

    let needle = reference.to_lowercase();
    let matches: Vec<_> = task
        .subtasks
        .iter()
        .filter(|s| s.title.to_lowercase().contains(&needle))
        .collect();

    match matches.len() {
        0 => Err(SubtaskError::SubtaskNotFound(reference.to_string())),
        1 => Ok(matches[0].id),
        _ => Err(SubtaskError::AmbiguousSubtask(
            matches.iter().map(|s| s.title.clone()).collect(),
        )),
    }
}

pub struct AddSubtaskParameters {
    pub task: String,
    pub title: String,
}

pub fn add_subtask(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AddSubtaskParameters,
) -> Result<Task, SubtaskError> {
    let title = parameters.title.trim().to_string();
    if title.is_empty() {
        return Err(SubtaskError::EmptyTitle);
    }

    let task_id = resolve_task(store, &parameters.task)?;
    store.add_subtask(task_id, title);

    storage.save(store)?;

    store
        .get_task(task_id)
        .cloned()
        .ok_or_else(|| ResolveTaskError::TaskNotFound(parameters.task).into())
}

pub struct ToggleSubtaskParameters {
    pub task: String,
    pub subtask: String,
    pub completed: bool,
}

pub fn toggle_subtask(
    store: &mut Store,
    storage: &impl Storage,
    parameters: ToggleSubtaskParameters,
) -> Result<Task, SubtaskError> {
    let task_id = resolve_task(store, &parameters.task)?;
    let task = store
        .get_task(task_id)
        .ok_or_else(|| ResolveTaskError::TaskNotFound(parameters.task.clone()))?;
    let subtask_id = resolve_subtask(task, &parameters.subtask)?;

    store.update_subtask(
        task_id,
        subtask_id,
        SubtaskPatch {
            completed: Some(parameters.completed),
            ..SubtaskPatch::default()
        },
    );

    storage.save(store)?;

    store
        .get_task(task_id)
        .cloned()
        .ok_or_else(|| ResolveTaskError::TaskNotFound(parameters.task).into())
}

pub struct DeleteSubtaskParameters {
    pub task: String,
    pub subtask: String,
}

pub fn delete_subtask(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteSubtaskParameters,
) -> Result<Task, SubtaskError> {
    let task_id = resolve_task(store, &parameters.task)?;
    let task = store
        .get_task(task_id)
        .ok_or_else(|| ResolveTaskError::TaskNotFound(parameters.task.clone()))?;
    let subtask_id = resolve_subtask(task, &parameters.subtask)?;

    store.delete_subtask(task_id, subtask_id);

    storage.save(store)?;

    store
        .get_task(task_id)
        .cloned()
        .ok_or_else(|| ResolveTaskError::TaskNotFound(parameters.task).into())
}
