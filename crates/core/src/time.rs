//! Backend timestamp parsing and formatting.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};

/// HTTP-date style timestamps, e.g. `Sun, 07 Dec 2025 08:56:00 GMT`.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Offset-free layouts accepted by the generic fallback; read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a backend timestamp.
///
/// The fixed-width HTTP-date form is tried first, then generic calendar
/// parsing (RFC 3339, RFC 2822, naive ISO-8601). Unparseable input yields
/// `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, HTTP_DATE_FORMAT) {
        return Some(naive.and_utc());
    }
    parse_generic(raw)
}

fn parse_generic(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Renders the optimizer start instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// The backend cuts the value at the first `.` and reads the rest as UTC, so
/// the fractional part is always emitted.
pub fn format_optimizer_start(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter: absent, `null`, non-string or malformed values become `None`.
pub(crate) fn deserialize_lenient_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        _ => None,
    })
}
