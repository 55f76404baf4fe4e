use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SlotKeys;
use crate::models::{now, Entity, InsertAt, ValidationContext};
use crate::record_id::new_record_id;
use crate::validator::{self, FieldErrors};

/// A person submitted through the user form. Immutable once stored; the slot
/// is only ever cleared as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default = "new_record_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Kept as entered; validated as a number on the way in.
    pub age: String,
    pub city: String,
    #[serde(default = "now", with = "crate::models::timestamp::epoch_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserDraft {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub city: String,
}

fn age(value: &str) -> Result<(), String> {
    let value = validator::required(value, "Age is required")?;
    validator::discard(validator::in_range(value, 12.0, 120.0, "Age must be between 12 and 120"))
}

fn city(value: &str) -> Result<(), String> {
    let value = validator::required(value, "City is required")?;
    validator::max_length(value, 30, "City must be at most 30 characters")
}

impl Entity for User {
    type Draft = UserDraft;

    const INSERT_AT: InsertAt = InsertAt::Front;

    fn default_slot(slots: &SlotKeys) -> &str {
        &slots.users
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(draft: &UserDraft, _ctx: &ValidationContext<'_, Self>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("fullName", validator::full_name(&draft.full_name, 2, 40));
        errors.check("email", validator::email(&draft.email));
        errors.check("phone", validator::phone(&draft.phone));
        errors.check("age", age(&draft.age));
        errors.check("city", city(&draft.city));
        errors
    }

    fn build(draft: &UserDraft, id: String, created_at: DateTime<Utc>) -> Self {
        User {
            id,
            full_name: draft.full_name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            age: draft.age.trim().to_string(),
            city: draft.city.trim().to_string(),
            created_at,
        }
    }
}
