use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use lc_core::{MemoryStateStorage, PROGRESS_KEY, StateStorage, StateStorageExt};
use tracing::{debug, error, warn};

/// Reading progress per content id (typically the scroll offset).
///
/// Mutations update memory and the persisted `progress` record in one step.
/// Clones share the same map.
#[derive(Clone)]
pub struct ProgressStore {
    positions: Arc<RwLock<BTreeMap<String, f64>>>,
    storage: Arc<dyn StateStorage>,
}

impl ProgressStore {
    /// Rehydrate progress persisted in `storage`; unreadable records start empty
    pub fn load(storage: Arc<dyn StateStorage>) -> Self {
        // null entries are dropped one by one rather than failing the whole record
        let positions = match storage.load::<BTreeMap<String, Option<f64>>>(PROGRESS_KEY) {
            Ok(Some(positions)) => positions
                .into_iter()
                .filter_map(|(id, pos)| pos.filter(|p| p.is_finite()).map(|p| (id, p)))
                .collect(),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to load reading progress: {}", e);
                BTreeMap::new()
            }
        };

        Self {
            positions: Arc::new(RwLock::new(positions)),
            storage,
        }
    }

    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemoryStateStorage::new()))
    }

    /// Record `position` for `content_id`, replacing any earlier value.
    ///
    /// NaN and infinite positions are ignored.
    pub fn save_progress(&self, content_id: &str, position: f64) {
        if !position.is_finite() {
            warn!("Ignoring non-finite progress {} for {}", position, content_id);
            return;
        }

        let mut positions = self.write();
        positions.insert(content_id.to_string(), position);
        debug!("Saved progress {} for {}", position, content_id);
        self.persist(&positions);
    }

    /// Stored position for `content_id`, `0.0` when none
    pub fn get_progress(&self, content_id: &str) -> f64 {
        self.positions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(content_id)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn clear_progress(&self, content_id: &str) {
        let mut positions = self.write();
        if positions.remove(content_id).is_some() {
            self.persist(&positions);
        }
    }

    /// All recorded positions, ordered by content id
    pub fn entries(&self) -> Vec<(String, f64)> {
        self.positions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, pos)| (id.clone(), *pos))
            .collect()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, f64>> {
        self.positions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, positions: &BTreeMap<String, f64>) {
        if let Err(e) = self.storage.save(PROGRESS_KEY, positions) {
            error!("Failed to persist reading progress: {}", e);
        }
    }
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("entries", &self.entries().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lc_core::FileStateStorage;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_get() {
        let store = ProgressStore::in_memory();
        store.save_progress("42", 812.5);
        assert_eq!(store.get_progress("42"), 812.5);

        store.save_progress("42", 100.0);
        assert_eq!(store.get_progress("42"), 100.0);
    }

    #[test]
    fn test_unknown_id_is_zero() {
        let store = ProgressStore::in_memory();
        assert_eq!(store.get_progress("nope"), 0.0);
    }

    #[test]
    fn test_clear_progress() {
        let store = ProgressStore::in_memory();
        store.save_progress("42", 812.5);
        store.save_progress("43", 1.0);

        store.clear_progress("42");
        store.clear_progress("never-saved");

        assert_eq!(store.get_progress("42"), 0.0);
        assert_eq!(store.entries(), vec![("43".to_string(), 1.0)]);
    }

    #[test]
    fn test_persisted_with_each_mutation() {
        let storage = Arc::new(MemoryStateStorage::new());
        let store = ProgressStore::load(storage.clone());

        store.save_progress("a", 10.0);
        assert_eq!(
            storage.load_raw(PROGRESS_KEY).unwrap().as_deref(),
            Some(r#"{"a":10.0}"#)
        );

        store.clear_progress("a");
        assert_eq!(storage.load_raw(PROGRESS_KEY).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_rehydrates_from_file() {
        let temp = TempDir::new().unwrap();
        {
            let storage = Arc::new(FileStateStorage::new(temp.path()).unwrap());
            ProgressStore::load(storage).save_progress("article-7", 2048.0);
        }

        let storage = Arc::new(FileStateStorage::new(temp.path()).unwrap());
        assert_eq!(ProgressStore::load(storage).get_progress("article-7"), 2048.0);
    }

    #[test]
    fn test_non_finite_position_is_ignored() {
        let temp = TempDir::new().unwrap();
        {
            let storage = Arc::new(FileStateStorage::new(temp.path()).unwrap());
            let store = ProgressStore::load(storage);
            store.save_progress("kept", 500.0);
            store.save_progress("kept", f64::NAN);
            store.save_progress("bad", f64::INFINITY);
            assert_eq!(store.entries(), vec![("kept".to_string(), 500.0)]);
        }

        let storage = Arc::new(FileStateStorage::new(temp.path()).unwrap());
        let store = ProgressStore::load(storage);
        assert_eq!(store.get_progress("kept"), 500.0);
        assert_eq!(store.get_progress("bad"), 0.0);
    }

    #[test]
    fn test_null_entry_only_loses_itself() {
        let storage = Arc::new(MemoryStateStorage::new());
        storage
            .save_raw(PROGRESS_KEY, r#"{"bad":null,"kept":500.0}"#)
            .unwrap();

        let store = ProgressStore::load(storage);
        assert_eq!(store.entries(), vec![("kept".to_string(), 500.0)]);
    }

    #[test]
    fn test_corrupted_record_starts_empty() {
        let storage = Arc::new(MemoryStateStorage::new());
        storage.save_raw(PROGRESS_KEY, "[1, 2]").unwrap();

        let store = ProgressStore::load(storage);
        assert!(store.entries().is_empty());
    }
}
