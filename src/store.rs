//! Key-value persistence
//!
//! The storage engine is an opaque collaborator. Components serialize to JSON
//! blobs under fixed keys; writes are best-effort and never retried.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{GestureResult, StoreError};

pub const PROFILE_KEY: &str = "calibration_profile";
pub const LEDGER_KEY: &str = "experience_ledger";
pub const TRAINING_QUEUE_KEY: &str = "training_queue";
pub const MODEL_KEY: &str = "classifier_model";

/// Opaque string store injected into the session
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store for native hosts and tests
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn save_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> GestureResult<()> {
    let blob = serde_json::to_string(value)?;
    store.set(key, &blob)?;
    Ok(())
}

/// Serialize and write, logging instead of propagating failures.
///
/// In-memory state stays authoritative when this fails.
pub fn persist<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = save_json(store, key, value) {
        log::warn!("Persisting '{}' failed, keeping in-memory state: {}", key, e);
    }
}

/// Load a blob, falling back to `T::default()` when absent or corrupt
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match store.get(key) {
        Ok(Some(blob)) => match serde_json::from_str(&blob) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Stored '{}' is corrupt, using defaults: {}", key, e);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Reading '{}' failed, using defaults: {}", key, e);
            T::default()
        }
    }
}
