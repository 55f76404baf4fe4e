//! Encodings for `createdAt`.
//!
//! Tasks keep their creation time as ISO-8601 text (`2024-01-01T10:00:00.000Z`),
//! every other entity as epoch milliseconds. Either reader accepts both shapes,
//! so a slot written by an older host still loads.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTime {
    Millis(i64),
    Text(String),
}

fn read<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match StoredTime::deserialize(deserializer)? {
        StoredTime::Millis(ms) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {ms}"))),
        StoredTime::Text(text) => DateTime::parse_from_rfc3339(text.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{text}': {e}"))),
    }
}

/// ISO-8601 text at millisecond precision, UTC with a `Z` suffix.
pub mod iso_millis {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        read(deserializer)
    }
}

/// Milliseconds since the Unix epoch.
pub mod epoch_millis {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(dt.timestamp_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        read(deserializer)
    }
}
