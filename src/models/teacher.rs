use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SlotKeys;
use crate::models::{now, Entity, InsertAt, ValidationContext};
use crate::record_id::new_record_id;
use crate::validator::{self, FieldErrors};

/// A teacher and the courses assigned to them.
///
/// `course_ids` are weak references: a course deleted later simply renders as
/// "Unknown" (see [`crate::lookup::course_label_by_id`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    #[serde(default = "new_record_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub expertise: String,
    #[serde(default)]
    pub course_ids: Vec<String>,
    #[serde(default = "now", with = "crate::models::timestamp::epoch_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeacherDraft {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub expertise: String,
    pub course_ids: Vec<String>,
}

fn expertise(value: &str) -> Result<(), String> {
    let value = validator::required(value, "Expertise is required")?;
    validator::max_length(value, 40, "Expertise must be at most 40 characters")
}

fn distinct(ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}

impl Entity for Teacher {
    type Draft = TeacherDraft;

    const INSERT_AT: InsertAt = InsertAt::Front;

    fn default_slot(slots: &SlotKeys) -> &str {
        &slots.teachers
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(draft: &TeacherDraft, _ctx: &ValidationContext<'_, Self>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("fullName", validator::full_name(&draft.full_name, 2, 50));
        errors.check("email", validator::email(&draft.email));
        errors.check("phone", validator::phone(&draft.phone));
        errors.check("expertise", expertise(&draft.expertise));
        errors.check(
            "courseIds",
            validator::at_least_one(&draft.course_ids, "Select at least one course"),
        );
        errors
    }

    fn build(draft: &TeacherDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Teacher {
            id,
            full_name: draft.full_name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            expertise: draft.expertise.trim().to_string(),
            course_ids: distinct(&draft.course_ids),
            created_at,
        }
    }
}
