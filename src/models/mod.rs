//! Record types and the contract every stored entity fulfils.
//!
//! Each entity comes as a pair: a *draft* holding raw form text, and a
//! *record* holding the normalized values that are persisted. A record is only
//! ever built from a draft that validated cleanly.

use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{SlotKeys, DEFAULT_MAX_UPLOAD_BYTES};
use crate::validator::FieldErrors;

pub mod course;
pub mod course_file;
pub mod task;
pub mod teacher;
pub(crate) mod timestamp;
pub mod user;

pub use course::{Course, CourseDraft};
pub use course_file::{CourseFile, CourseFileDraft};
pub use task::{Task, TaskDraft, TaskFlag};
pub use teacher::{Teacher, TeacherDraft};
pub use user::{User, UserDraft};

/// Entity selector used at the C ABI, spelled like the page names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tasks,
    Users,
    Courses,
    Teachers,
    Files,
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "tasks" => Ok(EntityKind::Tasks),
            "users" => Ok(EntityKind::Users),
            "courses" => Ok(EntityKind::Courses),
            "teachers" => Ok(EntityKind::Teachers),
            "files" => Ok(EntityKind::Files),
            other => Err(format!(
                "Unknown entity '{other}', expected tasks, users, courses, teachers or files"
            )),
        }
    }
}

/// Where a new record lands in its slot's array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    Front,
    Back,
}

/// What a validator may look at besides the draft itself.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a, E> {
    /// Records currently in the slot.
    pub existing: &'a [E],
    /// Id of the record being edited; excluded from uniqueness checks.
    pub editing_id: Option<&'a str>,
    pub max_upload_bytes: u64,
}

impl<'a, E> ValidationContext<'a, E> {
    pub fn new(existing: &'a [E]) -> Self {
        Self {
            existing,
            editing_id: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn editing(mut self, id: &'a str) -> Self {
        self.editing_id = Some(id);
        self
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }
}

pub trait Entity: Serialize + DeserializeOwned + Clone {
    type Draft: DeserializeOwned;

    const INSERT_AT: InsertAt;

    /// Slot this entity uses unless the caller names another one.
    fn default_slot(slots: &SlotKeys) -> &str;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    /// Recomputes the full error map for `draft`. Never partial, never panics.
    fn validate(draft: &Self::Draft, ctx: &ValidationContext<'_, Self>) -> FieldErrors;

    /// Builds a record from a draft that passed [`Entity::validate`].
    fn build(draft: &Self::Draft, id: String, created_at: DateTime<Utc>) -> Self;
}

/// Entities whose fields may be rewritten after creation.
pub trait Editable: Entity {
    /// Copy of `self` with the draft's normalized values; id and creation time kept.
    fn apply(&self, draft: &Self::Draft) -> Self;
}

/// Current time at millisecond precision, the precision `createdAt` is stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
