use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::StorageError;

/// Record holding the authentication session
pub const SESSION_KEY: &str = "session";

/// Record holding reading progress
pub const PROGRESS_KEY: &str = "progress";

/// Durable storage for named client-side state records.
///
/// Writes are synchronous so a store mutation and its persisted copy are
/// updated in the same step.
pub trait StateStorage: Send + Sync {
    /// Load the raw JSON of a record
    fn load_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the raw JSON of a record
    fn save_raw(&self, key: &str, json: &str) -> Result<(), StorageError>;

    /// Remove a record. Removing an absent record is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed helpers over [`StateStorage`]
pub trait StateStorageExt: StateStorage {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.load_raw(key)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|source| StorageError::Corrupted {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Corrupted {
            key: key.to_string(),
            source,
        })?;
        self.save_raw(key, &json)
    }
}

impl<S: StateStorage + ?Sized> StateStorageExt for S {}

/// In-memory storage for testing and ephemeral sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStorage {
    records: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStateStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStateStorage {
    fn load_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .records
            .read()
            .map_err(|_| StorageError::Poisoned)?
            .get(key)
            .cloned())
    }

    fn save_raw(&self, key: &str, json: &str) -> Result<(), StorageError> {
        self.records
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.records
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .remove(key);
        Ok(())
    }
}
