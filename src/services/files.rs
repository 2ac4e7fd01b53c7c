use thiserror::Error;

use crate::{
    models::{
        store::Store,
        task::{FileAttachment, Task},
    },
    services::{ResolveTaskError, resolve_task},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum FileError {
    #[error("File name cannot be empty")]
    EmptyName,

    #[error("No file named '{0}' on task '{1}'")]
    FileNotFound(String, String),

    #[error(transparent)]
    Task(#[from] ResolveTaskError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddFileParameters {
    pub task: String,
    pub name: String,
    pub kind: Option<String>,
    pub url: Option<String>,
}

pub fn add_file(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AddFileParameters,
) -> Result<Task, FileError> {
    let name = parameters.name.trim().to_string();
    if name.is_empty() {
        return Err(FileError::EmptyName);
    }

    // Default the kind to the file extension when none was given
    let kind = parameters.kind.unwrap_or_else(|| {
        name.rsplit_once('.')
            .map(|(_, extension)| extension.to_string())
            .unwrap_or_default()
    });

    let task_id = resolve_task(store, &parameters.task)?;
    store.add_file(
        task_id,
        FileAttachment {
            name,
            kind,
            url: parameters.url,
        },
    );

    storage.save(store)?;

    store
        .get_task(task_id)
        .cloned()
        .ok_or_else(|| ResolveTaskError::TaskNotFound(parameters.task).into())
}

pub struct DeleteFileParameters {
    pub task: String,
    pub name: String,
}

pub fn delete_file(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteFileParameters,
) -> Result<Task, FileError> {
    let task_id = resolve_task(store, &parameters.task)?;
    let task = store
        .get_task(task_id)
        .ok_or_else(|| ResolveTaskError::TaskNotFound(parameters.task.clone()))?;

    if !task.files.iter().any(|f| f.name == parameters.name) {
        return Err(FileError::FileNotFound(
            parameters.name,
            task.title.clone(),
        ));
    }

    store.delete_file(task_id, &parameters.name);

    storage.save(store)?;

    store
        .get_task(task_id)
        .cloned()
        .ok_or_else(|| ResolveTaskError::TaskNotFound(parameters.task).into())
}
