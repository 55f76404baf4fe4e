use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SlotKeys;
use crate::models::{now, Entity, InsertAt, ValidationContext};
use crate::record_id::new_record_id;
use crate::validator::{self, FieldErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default = "new_record_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "now", with = "crate::models::timestamp::iso_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
}

impl TaskDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Boolean fields of a task that can be flipped in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskFlag {
    Completed,
}

impl Task {
    pub fn toggled(&self, flag: TaskFlag) -> Self {
        let mut task = self.clone();
        match flag {
            TaskFlag::Completed => task.completed = !task.completed,
        }
        task
    }
}

impl Entity for Task {
    type Draft = TaskDraft;

    const INSERT_AT: InsertAt = InsertAt::Back;

    fn default_slot(slots: &SlotKeys) -> &str {
        &slots.tasks
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(draft: &TaskDraft, _ctx: &ValidationContext<'_, Self>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(
            "name",
            validator::discard(validator::required(&draft.name, "Task name is required")),
        );
        errors
    }

    fn build(draft: &TaskDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Task {
            id,
            name: draft.name.trim().to_string(),
            completed: false,
            created_at,
        }
    }
}
