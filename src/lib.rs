//! # Offline Admin Core
//!
//! Local-first record stores for a small administration app: tasks, users,
//! courses, teachers and course files. Each entity type lives in one *slot*, a
//! named storage location holding the full JSON array of its records.
//!
//! ## Features
//!
//! - **One store contract for every entity**: load, validate, mutate, persist the whole array
//! - **Pluggable storage**: any [`StoragePort`]; in-memory and LMDB adapters included
//! - **Pure validators**: every field checked independently, errors returned as a field map
//! - **Corruption is visible**: unreadable slots load as empty but report [`LoadStatus::Reset`]
//! - **FFI-ready**: C ABI for UI hosts, every call answers with a JSON [`AppResponse`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use offline_admin_core::models::{Course, CourseDraft};
//! use offline_admin_core::{MemoryStorage, RecordStore};
//!
//! let storage = MemoryStorage::new();
//! let mut courses: RecordStore<Course, _> = RecordStore::open_default(&storage);
//!
//! let draft = CourseDraft {
//!     code: "cs101".to_string(),
//!     name: "Intro".to_string(),
//!     credits: "3".to_string(),
//!     teacher_name: "A".to_string(),
//! };
//! let course = courses.add(&draft).expect("valid draft");
//! assert_eq!(course.code, "CS101");
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_store`] - Open the LMDB-backed slot database
//! - [`load_slot`] - Records of one entity plus the load status
//! - [`add_record`] - Validate a draft and append/prepend the new record
//! - [`update_record`] - Edit a record (courses)
//! - [`remove_record`] - Delete a record by id, no-op when absent
//! - [`toggle_task`] - Flip a task's `completed` flag
//! - [`clear_slot`] - Drop an entity's whole slot
//! - [`close_store`] - Close and free the database handle
//! - [`free_response`] - Release a string returned by any of the above

pub mod app_response;
pub mod config;
pub mod lookup;
pub mod models;
pub mod record_codec;
pub mod record_id;
pub mod record_store;
pub mod slot_db;
pub mod storage_port;
pub mod uploads;
pub mod validator;

pub use crate::app_response::AppResponse;
pub use crate::config::StoreConfig;
pub use crate::record_codec::{LoadStatus, Loaded, ResetReason};
pub use crate::record_store::RecordStore;
pub use crate::slot_db::SlotDb;
pub use crate::storage_port::{MemoryStorage, StoragePort};
pub use crate::validator::FieldErrors;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::str::FromStr;

use log::{info, warn};
use serde::Serialize;

use crate::models::{
    Course, CourseFile, Editable, Entity, EntityKind, Task, TaskFlag, Teacher, User,
};

/// Handle returned to FFI callers: the slot database plus the settings the
/// stores are opened with.
pub struct AdminDbState {
    pub db: SlotDb,
    pub config: StoreConfig,
}

impl AdminDbState {
    pub fn open(name: &str, config: StoreConfig) -> Result<Self, AppResponse> {
        let db = SlotDb::init_with(name, &config)?;
        Ok(Self { db, config })
    }

    fn store<E: Entity>(&self) -> RecordStore<E, &SlotDb> {
        RecordStore::open_with(&self.db, &self.config)
    }
}

/// Runs `$body` with `$e` bound to the record type selected by `$kind`.
macro_rules! with_entity {
    ($kind:expr, $e:ident => $body:expr) => {
        match $kind {
            EntityKind::Tasks => {
                type $e = Task;
                $body
            }
            EntityKind::Users => {
                type $e = User;
                $body
            }
            EntityKind::Courses => {
                type $e = Course;
                $body
            }
            EntityKind::Teachers => {
                type $e = Teacher;
                $body
            }
            EntityKind::Files => {
                type $e = CourseFile;
                $body
            }
        }
    };
}

/// Opens (or creates) the slot database `<name>.lmdb` with default settings.
///
/// # Returns
///
/// A pointer to the [`AdminDbState`], or null when the name is null, not
/// UTF-8, or the database cannot be opened. Release it with [`close_store`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use offline_admin_core::create_store;
///
/// let name = CString::new("admin_data").unwrap();
/// let state = create_store(name.as_ptr());
/// assert!(!state.is_null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(name: *const c_char) -> *mut AdminDbState {
    open_state(name, StoreConfig::default())
}

/// Like [`create_store`], with a JSON [`StoreConfig`]. Missing fields take
/// their defaults; invalid JSON yields null.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store_with_config(
    name: *const c_char,
    config_json: *const c_char,
) -> *mut AdminDbState {
    let config = match c_ptr_to_str(config_json) {
        Some(text) => match StoreConfig::from_json(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!("Rejected store config: {e}");
                return std::ptr::null_mut();
            }
        },
        None => {
            warn!("Null or invalid config pointer passed to create_store_with_config");
            return std::ptr::null_mut();
        }
    };

    open_state(name, config)
}

fn open_state(name: *const c_char, config: StoreConfig) -> *mut AdminDbState {
    let name = match c_ptr_to_str(name) {
        Some(name) => name,
        None => {
            warn!("Null or invalid name pointer passed to create_store");
            return std::ptr::null_mut();
        }
    };

    match AdminDbState::open(&name, config) {
        Ok(state) => {
            info!("Store '{name}' opened");
            Box::into_raw(Box::new(state))
        }
        Err(e) => {
            warn!("Failed to open store '{name}': {e}");
            std::ptr::null_mut()
        }
    }
}

/// Returns `{"records": [...], "status": ...}` for one entity's slot.
///
/// A corrupted slot still answers `Ok` with no records and a `Reset` status.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn load_slot(state: *mut AdminDbState, entity: *const c_char) -> *const c_char {
    let (state, kind) = match state_and_kind(state, entity) {
        Ok(pair) => pair,
        Err(err) => return err,
    };

    let response = with_entity!(kind, E => {
        let store = state.store::<E>();
        let view = SlotView {
            records: store.records(),
            status: store.status(),
        };
        let response = ok_json(&view);
        response
    });
    response_to_c_string(&response)
}

#[derive(Serialize)]
struct SlotView<'a, E> {
    records: &'a [E],
    status: &'a LoadStatus,
}

/// Validates the JSON draft and stores a new record.
///
/// Answers `Ok` with the stored record, or `ValidationError` with the field
/// map, in which case nothing was written.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_record(
    state: *mut AdminDbState,
    entity: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let (state, kind) = match state_and_kind(state, entity) {
        Ok(pair) => pair,
        Err(err) => return err,
    };
    let json = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let response = with_entity!(kind, E => add_from_json::<E>(state, &json));
    response_to_c_string(&response)
}

fn add_from_json<E: Entity>(state: &AdminDbState, json: &str) -> AppResponse {
    let draft: E::Draft = match serde_json::from_str(json) {
        Ok(draft) => draft,
        Err(e) => return AppResponse::SerializationError(format!("Invalid JSON: {e}")),
    };

    let mut store = state.store::<E>();
    match store.add(&draft) {
        Ok(record) => ok_json(&record),
        Err(e) => e,
    }
}

/// Edits the record `id` from a JSON draft. Only courses are editable; other
/// entities answer `BadRequest`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_record(
    state: *mut AdminDbState,
    entity: *const c_char,
    id: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let (state, kind) = match state_and_kind(state, entity) {
        Ok(pair) => pair,
        Err(err) => return err,
    };
    let id = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };
    let json = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let response = match kind {
        EntityKind::Courses => update_from_json::<Course>(state, &id, &json),
        other => AppResponse::BadRequest(format!("Records of {other:?} cannot be edited")),
    };
    response_to_c_string(&response)
}

fn update_from_json<E: Editable>(state: &AdminDbState, id: &str, json: &str) -> AppResponse {
    let draft: E::Draft = match serde_json::from_str(json) {
        Ok(draft) => draft,
        Err(e) => return AppResponse::SerializationError(format!("Invalid JSON: {e}")),
    };

    let mut store = state.store::<E>();
    match store.update(id, &draft) {
        Ok(record) => ok_json(&record),
        Err(e) => e,
    }
}

/// Deletes record `id`. Answers `Ok` with `{"removed": bool}`; an unknown id
/// is not an error.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn remove_record(
    state: *mut AdminDbState,
    entity: *const c_char,
    id: *const c_char,
) -> *const c_char {
    let (state, kind) = match state_and_kind(state, entity) {
        Ok(pair) => pair,
        Err(err) => return err,
    };
    let id = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    let result = with_entity!(kind, E => state.store::<E>().remove(&id));
    let response = match result {
        Ok(removed) => ok_json(&serde_json::json!({ "removed": removed })),
        Err(e) => e,
    };
    response_to_c_string(&response)
}

/// Flips `completed` on task `id` and answers with the updated task.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn toggle_task(state: *mut AdminDbState, id: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null state pointer passed to toggle_task".to_string());
            return response_to_c_string(&error);
        }
    };
    let id = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    let response = match state.store::<Task>().toggle(&id, TaskFlag::Completed) {
        Ok(task) => ok_json(&task),
        Err(e) => e,
    };
    response_to_c_string(&response)
}

/// Drops an entity's whole slot.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_slot(state: *mut AdminDbState, entity: *const c_char) -> *const c_char {
    let (state, kind) = match state_and_kind(state, entity) {
        Ok(pair) => pair,
        Err(err) => return err,
    };

    let result = with_entity!(kind, E => state.store::<E>().clear());
    let response = match result {
        Ok(()) => AppResponse::success(format!("Slot for {kind:?} cleared")),
        Err(e) => e,
    };
    response_to_c_string(&response)
}

/// Closes the database and frees the handle. The pointer must not be used
/// afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(state: *mut AdminDbState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_store".to_string());
        return response_to_c_string(&error);
    }

    let mut state = unsafe { Box::from_raw(state) };
    let response = match state.db.close_database() {
        Ok(()) => AppResponse::success("Store closed successfully"),
        Err(e) => e,
    };
    response_to_c_string(&response)
}

/// Releases a string returned by this library. Null is ignored.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(ptr as *mut c_char));
    }
}

fn state_and_kind<'a>(
    state: *mut AdminDbState,
    entity: *const c_char,
) -> Result<(&'a AdminDbState, EntityKind), *const c_char> {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null state pointer".to_string());
            return Err(response_to_c_string(&error));
        }
    };

    let entity = c_ptr_to_string(entity, "entity")?;
    match EntityKind::from_str(&entity) {
        Ok(kind) => Ok((state, kind)),
        Err(msg) => Err(response_to_c_string(&AppResponse::BadRequest(msg))),
    }
}

fn ok_json<T: Serialize + ?Sized>(value: &T) -> AppResponse {
    match serde_json::to_string(value) {
        Ok(json) => AppResponse::Ok(json),
        Err(e) => AppResponse::SerializationError(format!("Failed to serialize result: {e}")),
    }
}

/// Serializes `response` to JSON and hands ownership of the C string to the
/// caller, who frees it with [`free_response`]. Null if serialization fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust `String`, or an error response
/// naming `field_name` for null pointers and invalid UTF-8.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn c_ptr_to_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(str::to_string) }
}
