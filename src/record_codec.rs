//! Conversion between a slot's stored text and a typed record sequence.
//!
//! `load` never fails: a slot that cannot be read or parsed degrades to an
//! empty sequence. The [`LoadStatus`] tells callers which of those happened.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;
use crate::storage_port::StoragePort;

/// Why a slot's content was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetReason {
    /// The backend failed to return the value.
    Unreadable(String),
    /// The stored text is not valid JSON.
    InvalidJson(String),
    /// Valid JSON, but not an array.
    NotAnArray,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    /// The slot was never written.
    Empty,
    /// An array was read. `skipped` items could not be decoded and were dropped.
    Loaded { skipped: usize },
    /// The slot held something unusable; treated as empty.
    Reset(ResetReason),
}

impl LoadStatus {
    pub fn is_reset(&self) -> bool {
        matches!(self, LoadStatus::Reset(_))
    }
}

#[derive(Debug, Clone)]
pub struct Loaded<R> {
    pub records: Vec<R>,
    pub status: LoadStatus,
}

impl<R> Loaded<R> {
    fn empty(status: LoadStatus) -> Self {
        Self {
            records: Vec::new(),
            status,
        }
    }
}

/// Reads and decodes the slot at `key`.
///
/// Items are decoded one by one. Records missing `id` or `createdAt` get fresh
/// values through their serde defaults; items that still fail to decode are
/// dropped and counted.
pub fn load<R, P>(port: &P, key: &str) -> Loaded<R>
where
    R: DeserializeOwned,
    P: StoragePort + ?Sized,
{
    let raw = match port.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Loaded::empty(LoadStatus::Empty),
        Err(e) => {
            warn!("Slot '{key}' unreadable, treating as empty: {e}");
            return Loaded::empty(LoadStatus::Reset(ResetReason::Unreadable(e.to_string())));
        }
    };

    let items = match serde_json::from_str::<JsonValue>(&raw) {
        Ok(JsonValue::Array(items)) => items,
        Ok(_) => {
            warn!("Slot '{key}' does not hold an array, treating as empty");
            return Loaded::empty(LoadStatus::Reset(ResetReason::NotAnArray));
        }
        Err(e) => {
            warn!("Slot '{key}' holds invalid JSON, treating as empty: {e}");
            return Loaded::empty(LoadStatus::Reset(ResetReason::InvalidJson(e.to_string())));
        }
    };

    let total = items.len();
    let records: Vec<R> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<R>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Dropping item {index} of slot '{key}': {e}");
                None
            }
        })
        .collect();

    let skipped = total - records.len();
    debug!("Loaded {} records from slot '{key}' ({skipped} skipped)", records.len());
    Loaded {
        records,
        status: LoadStatus::Loaded { skipped },
    }
}

/// Records only, for callers that do not care why a slot is empty.
pub fn load_records<R, P>(port: &P, key: &str) -> Vec<R>
where
    R: DeserializeOwned,
    P: StoragePort + ?Sized,
{
    load(port, key).records
}

/// Serializes the full sequence and overwrites the slot.
pub fn save<R, P>(port: &P, key: &str, records: &[R]) -> Result<(), AppResponse>
where
    R: Serialize,
    P: StoragePort + ?Sized,
{
    let json = serde_json::to_string(records)?;
    port.set(key, &json)?;
    debug!("Saved {} records to slot '{key}'", records.len());
    Ok(())
}
