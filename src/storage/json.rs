use std::{
    fs::{self, OpenOptions, rename, write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde_json::to_string_pretty;
use uuid::Uuid;

use crate::{
    models::store::Store,
    storage::{Storage, StorageError},
};

/// How many snapshot backups to keep around
const KEPT_BACKUPS: usize = 5;

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Copies the current snapshot into the backups directory before it
    /// is replaced. Nothing to do on the very first save.
    fn create_backup(&self) -> Result<u64, StorageError> {
        let file_exists = fs::exists(&self.path).map_err(|e| StorageError::BackupFailed {
            path: self.path.clone(),
            source: e,
        })?;
        if !file_exists {
            return Ok(0);
        }

        let backups_dir = self.backup_dir();
        fs::create_dir_all(&backups_dir).map_err(|e| StorageError::BackupFailed {
            path: backups_dir,
            source: e,
        })?;

        let backup_path = self.next_backup_path();
        fs::copy(&self.path, &backup_path).map_err(|e| StorageError::BackupFailed {
            path: backup_path.clone(),
            source: e,
        })
    }

    fn cleanup_old_backups(&self) -> Result<(), StorageError> {
        let backups_dir = self.backup_dir();
        let backups_dir_exists =
            fs::exists(&backups_dir).map_err(|e| StorageError::CleanupFailed {
                dir: backups_dir.clone(),
                source: e,
            })?;
        if !backups_dir_exists {
            return Ok(());
        }

        let mut backups = fs::read_dir(&backups_dir)
            .map_err(|e| StorageError::CleanupFailed {
                dir: backups_dir.clone(),
                source: e,
            })?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();

        // Backup names start with a timestamp, so the oldest sort first
        backups.sort();

        let excess = backups.len().saturating_sub(KEPT_BACKUPS);
        for path in &backups[0..excess] {
            fs::remove_file(path).map_err(|e| StorageError::CleanupFailed {
                dir: backups_dir.clone(),
                source: e,
            })?;
        }

        Ok(())
    }

    fn backup_dir(&self) -> PathBuf {
        let parent = self.path.parent().unwrap_or(Path::new("."));
        parent.join("backups")
    }

    fn next_backup_path(&self) -> PathBuf {
        let timestamp = jiff::Timestamp::now().to_string();
        let filename = format!("{}-{:?}", timestamp, self.path.file_name());
        self.backup_dir().join(filename)
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Store, StorageError> {
        use crate::models::store::CURRENT_VERSION;
        use crate::storage::migrations::{apply_migrations, detect_version};

        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let file_version = detect_version(&content)?;

                if file_version > CURRENT_VERSION {
                    return Err(StorageError::FutureVersion(file_version));
                }

                let mut data: serde_json::Value =
                    serde_json::from_str(&content).map_err(|e| StorageError::ParseFailed {
                        path: self.path.clone(),
                        source: e,
                    })?;

                if file_version < CURRENT_VERSION {
                    data = apply_migrations(data, file_version, CURRENT_VERSION)?;
                }

                if let Some(obj) = data.as_object_mut() {
                    obj.insert("version".to_string(), serde_json::json!(CURRENT_VERSION));
                }

                let store: Store =
                    serde_json::from_value(data).map_err(|e| StorageError::ParseFailed {
                        path: self.path.clone(),
                        source: e,
                    })?;
                Ok(store)
            }
            // Missing file is a normal first start, not an error
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Store::default()),
            Err(e) => Err(StorageError::LoadFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        let json =
            to_string_pretty(store).map_err(|e| StorageError::SerializeFailed { source: e })?;

        let unique_temp = format!("{}.tmp.{}", self.path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        write(&temp_path, json).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        let lock_file_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            })?;

        self.create_backup()?;
        self.cleanup_old_backups()?;

        rename(&temp_path, &self.path).map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::models::{store::CURRENT_VERSION, task::TaskDraft};

    #[test]
    fn test_save_and_load_round_trip() {
        let mut store = Store::default();
        store.add_task(TaskDraft {
            title: String::from("Ship report"),
            category: String::from("Work"),
            due_date: Some(String::from("2026-03-01")),
            assignees: vec![String::from("Alice")],
            ..TaskDraft::default()
        });
        store.add_subtask(store.tasks[0].id, String::from("Draft outline"));

        let storage = JsonFileStorage::new(PathBuf::from("/tmp/taskdeck_round_trip.json"));
        storage.save(&store).expect("Should save the store");

        let loaded = storage.load().expect("Should load the saved store");
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].id, store.tasks[0].id);
        assert_eq!(loaded.tasks[0].title, "Ship report");
        assert_eq!(loaded.tasks[0].subtasks.len(), 1);
        // Timestamps come back as timestamps, not text
        assert_eq!(loaded.tasks[0].created_at, store.tasks[0].created_at);
        assert_eq!(loaded.tasks[0].updated_at, store.tasks[0].updated_at);
    }

    #[test]
    fn test_selection_is_not_persisted() {
        let mut store = Store::default();
        store.add_task(TaskDraft {
            title: String::from("Some Task"),
            category: String::from("Work"),
            ..TaskDraft::default()
        });
        store.set_selected_task(Some(store.tasks[0].clone()));

        let storage = JsonFileStorage::new(PathBuf::from("/tmp/taskdeck_selection.json"));
        storage.save(&store).unwrap();

        let loaded = storage.load().unwrap();
        assert!(loaded.selected_task.is_none());
        assert_eq!(loaded.tasks.len(), 1);
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let storage = JsonFileStorage::new(PathBuf::from("/tmp/taskdeck_does_not_exist.json"));
        let store = storage.load().expect("Missing file should not be an error");
        assert!(store.tasks.is_empty());
        assert_eq!(store.version, CURRENT_VERSION);
    }

    #[test]
    fn test_load_invalid_json() {
        let path = PathBuf::from("/tmp/taskdeck_invalid.json");
        std::fs::write(&path, "{ this is not valid json }").unwrap();

        let storage = JsonFileStorage::new(path);
        let result = storage.load();

        match result {
            Err(StorageError::ParseFailed { .. }) => {}
            _ => panic!("Expected ParseFailed error, got something else"),
        }
    }

    #[test]
    fn test_load_versionless_legacy_snapshot() {
        let path = PathBuf::from("/tmp/taskdeck_legacy.json");
        let old_json = r#"{
            "tasks": []
        }"#;

        std::fs::write(&path, old_json).unwrap();

        let storage = JsonFileStorage::new(path);
        let result = storage.load();

        match result {
            Ok(store) => {
                assert_eq!(store.version, CURRENT_VERSION);
            }
            Err(e) => panic!("Expected successful load, got error: {:?}", e),
        }
    }

    #[test]
    fn test_load_future_version() {
        let path = PathBuf::from("/tmp/taskdeck_future.json");
        let future_json = r#"{
            "version": 999,
            "tasks": []
        }"#;

        std::fs::write(&path, future_json).unwrap();

        let storage = JsonFileStorage::new(path);
        let result = storage.load();

        match result {
            Err(StorageError::FutureVersion(999)) => {}
            _ => panic!("Expected FutureVersion(999) error"),
        }
    }

    #[test]
    fn test_backup_creation_and_cleanup() {
        let test_dir = PathBuf::from("/tmp/taskdeck_backup_test");
        let _ = fs::remove_dir_all(&test_dir);
        fs::create_dir_all(&test_dir).unwrap();

        let store_path = test_dir.join("store.json");
        let storage = JsonFileStorage::new(store_path.clone());

        for i in 0..7 {
            let mut store = Store::default();
            store.add_task(TaskDraft {
                title: format!("Task {}", i),
                category: String::from("Work"),
                ..TaskDraft::default()
            });

            storage.save(&store).unwrap();

            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        let backups_dir = test_dir.join("backups");
        let backup_count = fs::read_dir(&backups_dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .count();

        assert_eq!(backup_count, KEPT_BACKUPS, "Should keep exactly {} backups", KEPT_BACKUPS);

        fs::remove_dir_all(&test_dir).unwrap();
    }

    #[test]
    fn test_backup_directory_created_on_second_save() {
        let test_dir = PathBuf::from("/tmp/taskdeck_backup_dir_test");
        let _ = fs::remove_dir_all(&test_dir);
        fs::create_dir_all(&test_dir).unwrap();

        let store_path = test_dir.join("store.json");
        let storage = JsonFileStorage::new(store_path.clone());

        let backups_dir = test_dir.join("backups");
        assert!(!backups_dir.exists(), "Backups dir should not exist yet");

        storage.save(&Store::default()).unwrap();

        assert!(
            !backups_dir.exists(),
            "Backups dir should not exist after first save"
        );

        storage.save(&Store::default()).unwrap();

        assert!(
            backups_dir.exists(),
            "Backups dir should be created on second save"
        );
        assert!(backups_dir.is_dir(), "Backups path should be a directory");

        fs::remove_dir_all(&test_dir).unwrap();
    }
}
