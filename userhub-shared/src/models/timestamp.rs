//! Lenient timestamp parsing for request payloads
//!
//! Clients send subscription end dates in whatever shape their payment
//! provider hands them. Accepted inputs:
//!
//! - RFC 3339 with offset: `2026-01-01T00:00:00Z`, `2026-01-01T02:00:00+02:00`
//! - naive date-time, read as UTC: `2026-01-01T00:00:00`, `2026-01-01 00:00:00.250`
//! - date only, UTC midnight: `2026-01-01`
//! - milliseconds since the Unix epoch: `1767225600000`, or a float such as
//!   `1767225600000.75` (fraction truncated)

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de::Error as _, Deserialize, Deserializer};

/// Timestamp parse failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimestampError {
    #[error("invalid timestamp: {0:?}")]
    Invalid(String),

    #[error("timestamp out of range: {0}")]
    OutOfRange(i64),
}

/// Parses a textual timestamp
pub fn parse(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    Err(TimestampError::Invalid(input.to_string()))
}

/// Converts epoch milliseconds
pub fn from_millis(millis: i64) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::from_timestamp_millis(millis).ok_or(TimestampError::OutOfRange(millis))
}

/// Converts fractional epoch milliseconds, truncating toward zero
pub fn from_millis_f64(millis: f64) -> Result<DateTime<Utc>, TimestampError> {
    let truncated = millis.trunc();
    if !truncated.is_finite() || truncated.abs() >= i64::MAX as f64 {
        return Err(TimestampError::Invalid(millis.to_string()));
    }
    from_millis(truncated as i64)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampInput {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

impl TimestampInput {
    fn into_datetime(self) -> Result<DateTime<Utc>, TimestampError> {
        match self {
            TimestampInput::Millis(millis) => from_millis(millis),
            TimestampInput::FractionalMillis(millis) => from_millis_f64(millis),
            TimestampInput::Text(text) => parse(&text),
        }
    }
}

/// Serde helper for patch fields: absent → `None`, `null` → `Some(None)`
///
/// Must be combined with `#[serde(default)]`.
pub fn deserialize_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<TimestampInput>::deserialize(deserializer)? {
        None => Ok(Some(None)),
        Some(input) => input
            .into_datetime()
            .map(|dt| Some(Some(dt)))
            .map_err(D::Error::custom),
    }
}

/// Serde helper for optional fields in the lenient formats
///
/// Must be combined with `#[serde(default)]`.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<TimestampInput>::deserialize(deserializer)?
        .map(TimestampInput::into_datetime)
        .transpose()
        .map_err(D::Error::custom)
}
