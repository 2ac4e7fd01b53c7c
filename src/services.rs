use thiserror::Error;
use uuid::Uuid;

use crate::models::{store::Store, task::Task};

pub mod files;
pub mod subtasks;
pub mod tasks;

#[derive(Debug, Error)]
pub enum ResolveTaskError {
    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Task reference is ambiguous. Multiple tasks found: {}", .0.join(", "))]
    AmbiguousTask(Vec<String>),
}

/// Resolves a command-line task reference to an id. A reference is a
/// full or prefix UUID, or failing that a case-insensitive fragment of
/// the title.
pub fn resolve_task(store: &Store, reference: &str) -> Result<Uuid, ResolveTaskError> {
    let needle = reference.to_lowercase();

    let id_matches: Vec<&Task> = store
        .tasks
        .iter()
        .filter(|t| t.id.to_string().starts_with(&needle))
        .collect();

    match id_matches.len() {
        1 => return Ok(id_matches[0].id),
        0 => {}
        _ => {
            let titles = id_matches.iter().map(|t| t.title.clone()).collect();
            return Err(ResolveTaskError::AmbiguousTask(titles));
        }
    }

    // Fall back to fuzzy matching on the title
    let title_matches: Vec<&Task> = store
        .tasks
        .iter()
        .filter(|t| t.title.to_lowercase().contains(&needle))
        .collect();

    match title_matches.len() {
        0 => Err(ResolveTaskError::TaskNotFound(reference.to_string())),
        1 => Ok(title_matches[0].id),
        _ => {
            let titles = title_matches.iter().map(|t| t.title.clone()).collect();
            Err(ResolveTaskError::AmbiguousTask(titles))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskDraft;

    fn store_with(titles: &[&str]) -> Store {
        let mut store = Store::default();
        for title in titles {
            store.add_task(TaskDraft {
                title: title.to_string(),
                category: String::from("Work"),
                ..TaskDraft::default()
            });
        }
        store
    }

    #[test]
    fn test_resolve_by_id_prefix() {
        let store = store_with(&["Write report", "Read book"]);
        let id = store.tasks[0].id;
        let prefix = &id.to_string()[..8];

        assert_eq!(resolve_task(&store, prefix).unwrap(), id);
    }

    #[test]
    fn test_resolve_by_title_fragment() {
        let store = store_with(&["Write report", "Read book"]);
        let expected = store
            .tasks
            .iter()
            .find(|t| t.title == "Read book")
            .unwrap()
            .id;

        assert_eq!(resolve_task(&store, "read").unwrap(), expected);
    }

    #[test]
    fn test_resolve_unknown_reference() {
        let store = store_with(&["Write report"]);
        assert!(matches!(
            resolve_task(&store, "missing"),
            Err(ResolveTaskError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_ambiguous_title_lists_candidates() {
        let store = store_with(&["Write report", "Write email"]);
        match resolve_task(&store, "write") {
            Err(ResolveTaskError::AmbiguousTask(titles)) => {
                assert_eq!(titles.len(), 2);
            }
            other => panic!("Expected AmbiguousTask, got {:?}", other),
        }
    }
}
