//! Durable single-slot persistence of `SessionState`.
//!
//! Storage failures never crash the caller: a failed load or a corrupt
//! record degrades to "no persisted session", and a failed save or clear
//! leaves the prior persisted state in effect.

use crate::model::SessionState;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Swappable storage backend for the session record. The replay engine and
/// the recording calls only ever see this interface, so the mechanism
/// underneath (a file, an in-memory slot) can change without touching them.
pub trait SessionStorage: Send + Sync {
    /// Read the persisted record. Returns `None` on any access or parse
    /// failure; never fails.
    fn load(&self) -> Option<SessionState>;

    /// Write the full record, overwriting whatever was there. Failures are
    /// swallowed; the prior persisted state then remains in effect.
    fn save(&self, state: &SessionState);

    /// Remove the persisted record. Failures are swallowed.
    fn clear(&self);

    /// Only the pinned-node list, usable before the rest of the session
    /// machinery initializes. `[]` when nothing is persisted.
    fn load_pinned_nodes(&self) -> Vec<String> {
        self.load().map(|s| s.pinned_nodes).unwrap_or_default()
    }
}

/// Session record persisted as one JSON file at a well-known path.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStore {
    fn load(&self) -> Option<SessionState> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::debug!("Session load failed ({}): {}", self.path.display(), e);
                }
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                // Corrupt record: same as no session.
                log::warn!("Discarding corrupt session record ({}): {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, state: &SessionState) {
        let raw = match serde_json::to_string(state) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Session serialize failed: {}", e);
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
        if let Err(e) = std::fs::write(&self.path, raw) {
            log::warn!("Session save failed ({}): {}", self.path.display(), e);
        }
    }

    fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Session clear failed ({}): {}", self.path.display(), e);
            }
        }
    }
}

/// In-memory session slot, for tests and embedded use. Holds the record in
/// serialized form so loads exercise the same parse path as the file store.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with a raw serialized record (possibly corrupt), for
    /// failure-path tests.
    pub fn with_raw(raw: &str) -> Self {
        Self { slot: Mutex::new(Some(raw.to_string())) }
    }
}

impl SessionStorage for MemorySessionStore {
    fn load(&self) -> Option<SessionState> {
        let slot = self.slot.lock().unwrap();
        let raw = slot.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Discarding corrupt session record: {}", e);
                None
            }
        }
    }

    fn save(&self, state: &SessionState) {
        match serde_json::to_string(state) {
            Ok(raw) => *self.slot.lock().unwrap() = Some(raw),
            Err(e) => log::warn!("Session serialize failed: {}", e),
        }
    }

    fn clear(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GraphAction, NodeLabel};
    use tempfile::TempDir;

    fn sample_state() -> SessionState {
        SessionState {
            action: Some(GraphAction::Search {
                query: "orders".to_string(),
                label: Some(NodeLabel::Table),
            }),
            selected_entity_type: Some(NodeLabel::Table),
            pinned_nodes: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.json"));

        assert_eq!(store.load(), None);

        let state = sample_state();
        store.save(&state);
        assert_eq!(store.load(), Some(state));
    }

    #[test]
    fn test_file_store_round_trip_empty_fields() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.json"));
        let state = SessionState::empty();
        store.save(&state);
        assert_eq!(store.load(), Some(state));
    }

    #[test]
    fn test_file_store_corrupt_record_is_no_session() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileSessionStore::new(&path);
        assert_eq!(store.load(), None);
        assert_eq!(store.load_pinned_nodes(), Vec::<String>::new());
    }

    #[test]
    fn test_file_store_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.json"));
        store.save(&sample_state());
        store.clear();
        assert_eq!(store.load(), None);
        // Clearing twice is fine.
        store.clear();
    }

    #[test]
    fn test_file_store_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("nested/dir/session.json"));
        store.save(&sample_state());
        assert!(store.load().is_some());
    }

    #[test]
    fn test_load_pinned_nodes_without_record() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load_pinned_nodes(), Vec::<String>::new());
    }

    #[test]
    fn test_load_pinned_nodes_with_record() {
        let store = MemorySessionStore::new();
        store.save(&sample_state());
        assert_eq!(store.load_pinned_nodes(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_memory_store_corrupt_record_is_no_session() {
        let store = MemorySessionStore::with_raw("][");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_is_total_overwrite() {
        let store = MemorySessionStore::new();
        store.save(&sample_state());
        store.save(&SessionState::empty());
        let loaded = store.load().unwrap();
        assert_eq!(loaded, SessionState::empty());
        assert!(loaded.pinned_nodes.is_empty());
    }
}
