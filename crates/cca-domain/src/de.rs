//! Lenient field decoders for backend records.
//!
//! List endpoints mix record shapes. A single odd field must not fail the
//! whole list, so these decoders fall back to an empty value instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::format::parse_backend_date;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

/// Record id sent either as a string or as a number
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(id)) => id,
        Some(RawId::Number(id)) => id.to_string(),
        None => String::new(),
    })
}

/// Date string in any shape `parse_backend_date` accepts, or epoch millis.
/// Anything else reads as missing.
pub fn date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(raw)) => parse_backend_date(&raw),
        Some(Value::Number(millis)) => millis.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}
