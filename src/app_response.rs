use std::fmt::{Display, Formatter};

use lmdb::Error as LmdbError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::validator::FieldErrors;

/// Outcome type shared by the stores, the storage adapters and the C ABI.
///
/// Every fallible operation in the crate returns `Result<_, AppResponse>`; the
/// FFI layer serializes the whole enum to JSON so hosts can switch on the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(FieldErrors),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(errors) => write!(f, "Validation error: {}", errors),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl std::error::Error for AppResponse {}

impl From<LmdbError> for AppResponse {
    fn from(err: LmdbError) -> Self {
        match err {
            LmdbError::NotFound => AppResponse::NotFound("Key not found in slot database".to_string()),
            LmdbError::Corrupted => AppResponse::DatabaseError("Slot database is corrupted".to_string()),
            LmdbError::MapFull => {
                AppResponse::DatabaseError("Slot database is full, raise map_size_bytes".to_string())
            }
            LmdbError::Other(code) => AppResponse::DatabaseError(format!("IO error (code {})", code)),
            _ => AppResponse::DatabaseError(format!("LMDB error: {}", err)),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<FieldErrors> for AppResponse {
    fn from(errors: FieldErrors) -> Self {
        AppResponse::ValidationError(errors)
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    /// Field map of a rejected draft, if this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppResponse::ValidationError(errors) => Some(errors),
            _ => None,
        }
    }
}
