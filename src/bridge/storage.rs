//! `localStorage`-backed key-value store

use web_sys::Storage;

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// Prefix keeps our blobs apart from the host page's own keys
const KEY_PREFIX: &str = "pose_control.";

pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    pub fn open() -> Result<Self, StoreError> {
        let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(&format!("{}{}", KEY_PREFIX, key))
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(&format!("{}{}", KEY_PREFIX, key), value)
            .map_err(|e| StoreError::WriteRejected { key: key.to_string(), reason: format!("{:?}", e) })
    }
}
