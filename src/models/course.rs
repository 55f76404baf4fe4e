use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SlotKeys;
use crate::models::{now, Editable, Entity, InsertAt, ValidationContext};
use crate::record_id::new_record_id;
use crate::validator::{self, FieldErrors};

pub const MAX_CREDITS: u8 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default = "new_record_id")]
    pub id: String,
    /// Always stored uppercase, e.g. `CS101`.
    pub code: String,
    pub name: String,
    pub credits: u8,
    pub teacher_name: String,
    #[serde(default = "now", with = "crate::models::timestamp::epoch_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CourseDraft {
    pub code: String,
    pub name: String,
    /// Raw text from the form; parsed on validation.
    pub credits: String,
    pub teacher_name: String,
}

impl CourseDraft {
    /// Draft pre-filled from a stored course, for the edit dialog.
    pub fn from_course(course: &Course) -> Self {
        Self {
            code: course.code.clone(),
            name: course.name.clone(),
            credits: course.credits.to_string(),
            teacher_name: course.teacher_name.clone(),
        }
    }
}

fn name(value: &str) -> Result<(), String> {
    let value = validator::required(value, "Course name is required")?;
    validator::max_length(value, 60, "Max 60 characters")
}

fn credits(value: &str) -> Result<(), String> {
    let value = validator::required(value, "Credits is required")?;
    let credits = validator::in_range(value, 0.0, f64::from(MAX_CREDITS), "Credits must be 0-30")?;
    if credits.fract() != 0.0 {
        return Err("Credits must be 0-30".to_string());
    }
    Ok(())
}

fn parse_credits(value: &str) -> u8 {
    validator::finite_number(value)
        .filter(|n| *n >= 0.0 && *n <= f64::from(MAX_CREDITS))
        .map(|n| n as u8)
        .unwrap_or(0)
}

impl Entity for Course {
    type Draft = CourseDraft;

    const INSERT_AT: InsertAt = InsertAt::Front;

    fn default_slot(slots: &SlotKeys) -> &str {
        &slots.courses
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(draft: &CourseDraft, ctx: &ValidationContext<'_, Self>) -> FieldErrors {
        let mut errors = FieldErrors::new();

        errors.check("code", validator::course_code_format(&draft.code));
        errors.check("name", name(&draft.name));
        errors.check("credits", credits(&draft.credits));
        errors.check(
            "teacherName",
            validator::discard(validator::required(&draft.teacher_name, "Teacher name is required")),
        );

        // A duplicate code is reported over a format problem.
        let others = ctx.existing.iter().map(|c| (c.id.as_str(), c.code.as_str()));
        errors.check("code", validator::unique_code(&draft.code, others, ctx.editing_id));

        errors
    }

    fn build(draft: &CourseDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Course {
            id,
            code: validator::normalize_code(&draft.code),
            name: draft.name.trim().to_string(),
            credits: parse_credits(&draft.credits),
            teacher_name: draft.teacher_name.trim().to_string(),
            created_at,
        }
    }
}

impl Editable for Course {
    fn apply(&self, draft: &CourseDraft) -> Self {
        Course::build(draft, self.id.clone(), self.created_at)
    }
}
