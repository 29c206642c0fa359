//! Serde adapter for business-event timestamps.
//!
//! The ERP business-event framework emits dates in the Microsoft JSON form
//! `/Date(1672531200000)/` (optionally with a `+hhmm` offset suffix), while
//! hand-written callers send RFC 3339. Both are accepted; `null` or a missing
//! field yields the Unix epoch. Serialization always produces RFC 3339.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::types::Timestamp;

const MS_DATE_PREFIX: &str = "/Date(";
const MS_DATE_SUFFIX: &str = ")/";

pub fn serialize<S>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Timestamp::default()),
        Some(raw) => parse(&raw).map_err(serde::de::Error::custom),
    }
}

/// Parse a timestamp in any of the accepted wire forms.
pub fn parse(raw: &str) -> Result<Timestamp, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Timestamp::default());
    }

    if let Some(inner) = raw
        .strip_prefix(MS_DATE_PREFIX)
        .and_then(|rest| rest.strip_suffix(MS_DATE_SUFFIX))
    {
        return parse_ms_date(inner).ok_or_else(|| format!("invalid Microsoft JSON date '{raw}'"));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    // Offset-less ISO timestamps are taken as UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
}

/// `1672531200000`, `1672531200000+0100`, `-62135596800000`. The offset only
/// describes the sender's local zone; the instant is the millisecond count.
fn parse_ms_date(inner: &str) -> Option<Timestamp> {
    let split_at = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .unwrap_or(inner.len());

    let (millis, offset) = inner.split_at(split_at);
    if !offset.is_empty() && (offset.len() != 5 || !offset[1..].bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let millis: i64 = millis.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_utc() {
        let ts = parse("2023-01-01T00:05:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 1, 1, 0, 5, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse("2023-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_microsoft_json_date() {
        let ts = parse("/Date(1672531200000)/").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn microsoft_json_date_offset_does_not_shift_instant() {
        let ts = parse("/Date(1672531200000+0100)/").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn negative_microsoft_json_date() {
        let ts = parse("/Date(-1000)/").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn naive_timestamp_is_utc() {
        let ts = parse("2023-01-01T00:00:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn blank_is_epoch() {
        assert_eq!(parse("").unwrap(), Timestamp::default());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse("yesterday").is_err());
        assert!(parse("/Date(abc)/").is_err());
        assert!(parse("/Date(1000+1)/").is_err());
    }
}
