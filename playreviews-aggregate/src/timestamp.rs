//! Parsing and formatting of the timestamps found in reviews and filters.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

/// Parse an ISO-8601 style date or date-time.
///
/// A bare `YYYY-MM-DD` is midnight UTC on that day. Date-times without an
/// offset are taken to be in UTC. Instants outside years 0000 to 9999 are
/// rejected, since [`format`] can't write them in four digits.
pub fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    parse_any_year(s).filter(has_four_digit_year)
}

/// Whether [`format`] writes `instant` with a plain four digit year.
fn has_four_digit_year(instant: &DateTime<Utc>) -> bool {
    (0..=9999).contains(&instant.year())
}

/// [`parse_str`] without the year range check.
fn parse_any_year(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Some(instant.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
}

/// Read a timestamp from loose JSON: an ISO-8601 string or epoch
/// milliseconds. The same year range as [`parse_str`] applies.
pub fn from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .filter(has_four_digit_year),
        _ => None,
    }
}

/// Format as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current time, formatted with [`format`].
pub fn now() -> String {
    format(&Utc::now())
}

/// Serde adapter that writes instants with [`format`] and reads any RFC 3339
/// instant.
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serialize with millisecond precision and a `Z` suffix.
    pub fn serialize<S: Serializer>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(instant))
    }

    /// Deserialize from any form [`super::parse_str`] accepts.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_str(&s)
            .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Str(&s), &"an ISO-8601 date"))
    }
}
