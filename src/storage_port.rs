//! Key-value storage port.
//!
//! Stores never talk to a concrete backend. They are handed something that can
//! read, overwrite and drop a text value by key; [`MemoryStorage`] backs tests and
//! ephemeral hosts, [`crate::slot_db::SlotDb`] backs durable ones.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::app_response::AppResponse;

pub trait StoragePort {
    /// Raw text stored under `key`, or `None` if the slot was never written.
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse>;

    /// Overwrites the slot with `value`.
    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse>;

    /// Drops the slot. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), AppResponse>;
}

impl<T: StoragePort + ?Sized> StoragePort for &T {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), AppResponse> {
        (**self).remove(key)
    }
}

impl<T: StoragePort + ?Sized> StoragePort for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), AppResponse> {
        (**self).remove(key)
    }
}

/// In-process storage. Cloning a handle is not provided; share it by reference
/// or wrap it in an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a slot with raw text, e.g. data written by an older host.
    pub fn with_slot(self, key: &str, raw: &str) -> Self {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(key.to_string(), raw.to_string());
        }
        self
    }

    /// Current raw text of a slot.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.lock().ok().and_then(|slots| slots.get(key).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, AppResponse> {
        self.slots
            .lock()
            .map_err(|_| AppResponse::DatabaseError("Memory storage lock poisoned".to_string()))
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppResponse> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppResponse> {
        self.lock()?.remove(key);
        Ok(())
    }
}
