use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;

/// Largest upload accepted for a course file, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2_000_000;

/// Slot keys per entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlotKeys {
    pub tasks: String,
    pub users: String,
    pub courses: String,
    pub teachers: String,
    pub files: String,
}

impl Default for SlotKeys {
    fn default() -> Self {
        Self {
            tasks: "myTasksList".to_string(),
            users: "forms_users_v1".to_string(),
            courses: "courses_v1".to_string(),
            teachers: "teachers_v1".to_string(),
            files: "course_files_v1".to_string(),
        }
    }
}

/// Host-supplied settings. Every field is optional in JSON and falls back to
/// the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub slots: SlotKeys,
    pub max_upload_bytes: u64,
    pub map_size_bytes: usize,
    pub max_dbs: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            slots: SlotKeys::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            // Each upload is stored base64-encoded, so leave generous room.
            map_size_bytes: 256 * 1024 * 1024,
            max_dbs: 4,
        }
    }
}

impl StoreConfig {
    pub fn from_json(text: &str) -> Result<Self, AppResponse> {
        let config: StoreConfig = serde_json::from_str(text)?;
        if config.max_dbs == 0 {
            return Err(AppResponse::BadRequest("maxDbs must be at least 1".to_string()));
        }
        Ok(config)
    }
}
