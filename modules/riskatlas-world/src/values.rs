use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Parse a timestamp the way collaborator rows deliver them.
///
/// Accepts RFC 3339 (`2025-03-01T10:00:00+00:00`) and naive ISO-8601 with either a
/// `T` or a space separator, which is read as UTC. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Serde adapter for optional timestamps that must never fail a whole snapshot.
///
/// Strings go through [`parse_timestamp`]; null, numbers and unparseable text all
/// decode to `None`.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => parse_timestamp(&s),
        _ => None,
    })
}

/// Serde adapter for nested blobs whose shape isn't guaranteed. Anything that doesn't
/// decode as `T` becomes `None` instead of failing the row.
pub fn lenient_json<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
