//! One store per slot: the in-memory array, its validator and the
//! persist-on-change rule.
//!
//! Every mutation computes the next array, writes the whole of it to the slot,
//! and only then swaps it in. A rejected draft or a failed write leaves both
//! memory and storage as they were.

use log::{info, warn};

use crate::app_response::AppResponse;
use crate::config::{SlotKeys, StoreConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::models::{now, Editable, Entity, InsertAt, Task, TaskFlag, ValidationContext};
use crate::record_codec::{self, LoadStatus};
use crate::record_id::unique_record_id;
use crate::storage_port::StoragePort;
use crate::validator::FieldErrors;

pub struct RecordStore<E: Entity, P: StoragePort> {
    port: P,
    key: String,
    records: Vec<E>,
    status: LoadStatus,
    max_upload_bytes: u64,
}

impl<E: Entity, P: StoragePort> RecordStore<E, P> {
    /// Binds a store to `key` and loads whatever the slot holds.
    pub fn open(port: P, key: impl Into<String>) -> Self {
        let key = key.into();
        let loaded = record_codec::load::<E, P>(&port, &key);
        if loaded.status.is_reset() {
            warn!("Slot '{key}' was reset on open: {:?}", loaded.status);
        }

        Self {
            port,
            key,
            records: loaded.records,
            status: loaded.status,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Opens the entity's default slot.
    pub fn open_default(port: P) -> Self {
        let key = E::default_slot(&SlotKeys::default()).to_string();
        Self::open(port, key)
    }

    /// Opens the slot `config` names for this entity, with its upload limit.
    pub fn open_with(port: P, config: &StoreConfig) -> Self {
        let key = E::default_slot(&config.slots).to_string();
        let mut store = Self::open(port, key);
        store.max_upload_bytes = config.max_upload_bytes;
        store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn records(&self) -> &[E] {
        &self.records
    }

    /// How the last load went.
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&E> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Re-reads the slot, picking up writes made through another handle.
    pub fn reload(&mut self) -> &LoadStatus {
        let loaded = record_codec::load::<E, P>(&self.port, &self.key);
        self.records = loaded.records;
        self.status = loaded.status;
        &self.status
    }

    fn context(&self) -> ValidationContext<'_, E> {
        ValidationContext::new(&self.records).with_max_upload_bytes(self.max_upload_bytes)
    }

    /// Error map for `draft` as a new record. Empty means `add` would accept it.
    pub fn validate(&self, draft: &E::Draft) -> FieldErrors {
        E::validate(draft, &self.context())
    }

    pub fn add(&mut self, draft: &E::Draft) -> Result<E, AppResponse> {
        let errors = self.validate(draft);
        if !errors.is_empty() {
            info!("Rejected new record for slot '{}': {}", self.key, errors);
            return Err(AppResponse::ValidationError(errors));
        }

        let id = unique_record_id(self.records.iter().map(|r| r.id()));
        let record = E::build(draft, id, now());

        let next = with_inserted(&self.records, record.clone(), E::INSERT_AT);
        self.commit(next)?;
        Ok(record)
    }

    /// Drops the record with `id`. Returns `false` (and writes nothing) if absent.
    pub fn remove(&mut self, id: &str) -> Result<bool, AppResponse> {
        if self.find(id).is_none() {
            return Ok(false);
        }

        let next = without(&self.records, id);
        self.commit(next)?;
        Ok(true)
    }

    /// Deletes the slot itself and empties the store.
    pub fn clear(&mut self) -> Result<(), AppResponse> {
        self.port.remove(&self.key)?;
        self.records.clear();
        self.status = LoadStatus::Empty;
        info!("Cleared slot '{}'", self.key);
        Ok(())
    }

    fn commit(&mut self, next: Vec<E>) -> Result<(), AppResponse> {
        if let Err(e) = record_codec::save(&self.port, &self.key, &next) {
            warn!("Write to slot '{}' failed, keeping previous state: {e}", self.key);
            return Err(e);
        }
        self.records = next;
        Ok(())
    }
}

impl<E: Editable, P: StoragePort> RecordStore<E, P> {
    /// Rewrites the record with `id` from `draft`, keeping its id and creation time.
    pub fn update(&mut self, id: &str, draft: &E::Draft) -> Result<E, AppResponse> {
        let current = self
            .find(id)
            .ok_or_else(|| AppResponse::NotFound(format!("No record found with id: {id}")))?;

        let errors = E::validate(draft, &self.context().editing(id));
        if !errors.is_empty() {
            info!("Rejected update of '{id}' in slot '{}': {}", self.key, errors);
            return Err(AppResponse::ValidationError(errors));
        }

        let updated = current.apply(draft);
        let next = with_replaced(&self.records, updated.clone());
        self.commit(next)?;
        Ok(updated)
    }
}

impl<P: StoragePort> RecordStore<Task, P> {
    /// Flips `flag` on the task with `id`.
    pub fn toggle(&mut self, id: &str, flag: TaskFlag) -> Result<Task, AppResponse> {
        let toggled = self
            .find(id)
            .map(|task| task.toggled(flag))
            .ok_or_else(|| AppResponse::NotFound(format!("No task found with id: {id}")))?;

        let next = with_replaced(&self.records, toggled.clone());
        self.commit(next)?;
        Ok(toggled)
    }
}

/// New array with `record` added at the front or back.
pub fn with_inserted<E: Clone>(records: &[E], record: E, at: InsertAt) -> Vec<E> {
    let mut next = Vec::with_capacity(records.len() + 1);
    match at {
        InsertAt::Front => {
            next.push(record);
            next.extend_from_slice(records);
        }
        InsertAt::Back => {
            next.extend_from_slice(records);
            next.push(record);
        }
    }
    next
}

/// New array where the record sharing `record`'s id is replaced in place.
pub fn with_replaced<E: Entity>(records: &[E], record: E) -> Vec<E> {
    records
        .iter()
        .map(|existing| {
            if existing.id() == record.id() {
                record.clone()
            } else {
                existing.clone()
            }
        })
        .collect()
}

/// New array without the record `id`.
pub fn without<E: Entity>(records: &[E], id: &str) -> Vec<E> {
    records.iter().filter(|r| r.id() != id).cloned().collect()
}
