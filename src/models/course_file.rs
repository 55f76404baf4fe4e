use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SlotKeys;
use crate::models::{now, Entity, InsertAt, ValidationContext};
use crate::record_id::new_record_id;
use crate::uploads::{decode_data_url, encode_data_url, DEFAULT_MIME};
use crate::validator::{self, FieldErrors};

/// An uploaded document attached to a course, content inlined as a data URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFile {
    #[serde(default = "new_record_id")]
    pub id: String,
    pub course_id: String,
    pub display_name: String,
    pub original_name: String,
    #[serde(default)]
    pub mime_type: String,
    pub size_bytes: u64,
    pub data_url: String,
    #[serde(default = "now", with = "crate::models::timestamp::epoch_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CourseFileDraft {
    pub course_id: String,
    pub display_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub data_url: String,
}

impl CourseFileDraft {
    /// Turns a picked file into a draft.
    ///
    /// The size limit is enforced before the bytes are encoded, so an oversized
    /// file is never converted.
    pub fn from_upload(
        course_id: &str,
        display_name: &str,
        original_name: &str,
        mime_type: &str,
        bytes: &[u8],
        max_bytes: u64,
    ) -> Result<Self, FieldErrors> {
        let size_bytes = bytes.len() as u64;

        let mut errors = FieldErrors::new();
        errors.check("sizeBytes", size_limit(size_bytes, max_bytes));
        errors.into_result()?;

        let mime_type = mime_or_default(mime_type);
        Ok(Self {
            course_id: course_id.to_string(),
            display_name: display_name.to_string(),
            original_name: original_name.to_string(),
            data_url: encode_data_url(&mime_type, bytes),
            mime_type,
            size_bytes,
        })
    }
}

fn mime_or_default(mime: &str) -> String {
    let mime = mime.trim();
    if mime.is_empty() {
        DEFAULT_MIME.to_string()
    } else {
        mime.to_string()
    }
}

/// Byte length of the decoded payload, if `data_url` is a base64 data URL.
fn payload_len(data_url: &str) -> Option<u64> {
    decode_data_url(data_url.trim()).map(|(_, bytes)| bytes.len() as u64)
}

fn data_url(value: &str) -> Result<(), String> {
    let value = validator::required(value, "File content is missing")?;
    match payload_len(value) {
        Some(_) => Ok(()),
        None => Err("File content is not a valid data URL".to_string()),
    }
}

fn size_limit(size: u64, max: u64) -> Result<(), String> {
    if size <= max {
        return Ok(());
    }
    if max % 1_000_000 == 0 {
        Err(format!("File is too large (max {}MB)", max / 1_000_000))
    } else {
        Err(format!("File is too large (max {} bytes)", max))
    }
}

impl Entity for CourseFile {
    type Draft = CourseFileDraft;

    const INSERT_AT: InsertAt = InsertAt::Front;

    fn default_slot(slots: &SlotKeys) -> &str {
        &slots.files
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn validate(draft: &CourseFileDraft, ctx: &ValidationContext<'_, Self>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(
            "courseId",
            validator::discard(validator::required(&draft.course_id, "Please select a course")),
        );
        errors.check(
            "displayName",
            validator::discard(validator::required(&draft.display_name, "Display name is required")),
        );
        errors.check(
            "originalName",
            validator::discard(validator::required(&draft.original_name, "Please choose a file")),
        );
        // The claimed size may understate the payload.
        let size = draft.size_bytes.max(payload_len(&draft.data_url).unwrap_or(0));
        errors.check("sizeBytes", size_limit(size, ctx.max_upload_bytes));
        errors.check("dataUrl", data_url(&draft.data_url));
        errors
    }

    fn build(draft: &CourseFileDraft, id: String, created_at: DateTime<Utc>) -> Self {
        CourseFile {
            id,
            course_id: draft.course_id.trim().to_string(),
            display_name: draft.display_name.trim().to_string(),
            original_name: draft.original_name.clone(),
            mime_type: mime_or_default(&draft.mime_type),
            size_bytes: payload_len(&draft.data_url).unwrap_or(draft.size_bytes),
            data_url: draft.data_url.trim().to_string(),
            created_at,
        }
    }
}
