//! Persisted subscriber list (§6): a UTF-8 JSON array of integer chat
//! identifiers at a configured path, read on startup, written on every add/remove.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubscriberError {
    #[error("failed to read subscriber list at {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("failed to write subscriber list at {path}: {source}")]
    Write { path: String, #[source] source: std::io::Error },

    #[error("failed to parse subscriber list at {path}: {source}")]
    Parse { path: String, #[source] source: serde_json::Error },
}

pub struct SubscriberStore {
    path: PathBuf,
    subscribers: RwLock<Vec<i64>>,
}

impl SubscriberStore {
    /// Loads the subscriber list from `path`, treating a missing file as an
    /// empty list (first run).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SubscriberError> {
        let path = path.as_ref().to_path_buf();
        let subscribers = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| SubscriberError::Parse { path: path.display().to_string(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(SubscriberError::Read { path: path.display().to_string(), source }),
        };
        Ok(Self { path, subscribers: RwLock::new(subscribers) })
    }

    pub fn list(&self) -> Vec<i64> {
        self.subscribers.read().unwrap().clone()
    }

    /// Adds `subscriber_id` if absent, persisting the set immediately.
    pub fn add(&self, subscriber_id: i64) -> Result<bool, SubscriberError> {
        let added = {
            let mut guard = self.subscribers.write().unwrap();
            if guard.contains(&subscriber_id) {
                false
            } else {
                guard.push(subscriber_id);
                true
            }
        };
        if added {
            self.persist()?;
        }
        Ok(added)
    }

    pub fn remove(&self, subscriber_id: i64) -> Result<bool, SubscriberError> {
        let removed = {
            let mut guard = self.subscribers.write().unwrap();
            let before = guard.len();
            guard.retain(|&id| id != subscriber_id);
            guard.len() != before
        };
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    fn persist(&self) -> Result<(), SubscriberError> {
        let snapshot = self.subscribers.read().unwrap().clone();
        let raw = serde_json::to_string(&snapshot).expect("Vec<i64> always serialises");
        std::fs::write(&self.path, raw).map_err(|source| SubscriberError::Write { path: self.path.display().to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubscriberStore::load(dir.path().join("subs.json")).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn add_persists_and_round_trips_through_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.json");

        let store = SubscriberStore::load(&path).unwrap();
        assert!(store.add(100).unwrap());
        assert!(!store.add(100).unwrap());

        let reloaded = SubscriberStore::load(&path).unwrap();
        assert_eq!(reloaded.list(), vec![100]);
    }

    #[test]
    fn remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.json");

        let store = SubscriberStore::load(&path).unwrap();
        store.add(100).unwrap();
        store.add(200).unwrap();
        assert!(store.remove(100).unwrap());

        let reloaded = SubscriberStore::load(&path).unwrap();
        assert_eq!(reloaded.list(), vec![200]);
    }
}
