//! # Temporal Types: UTC Timestamps
//!
//! Defines `Timestamp`, a UTC-only instant truncated to seconds precision,
//! rendered as `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! ## Wire Compatibility
//!
//! The Contract Store emits `createdAt` / `signedAt` / `resolvedAt` as
//! zone-less local datetimes (`2026-01-15T12:00:00.123456`). Those are read
//! as UTC. RFC 3339 inputs with any offset are converted to UTC. Output is
//! always the `Z` form.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A UTC timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`]: from an RFC 3339 string or a zone-less
///   store datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp.
    ///
    /// Accepts RFC 3339 with any offset (converted to UTC) and the store's
    /// zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` form (taken as UTC).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimestamp`] if neither form matches.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Self(truncate_to_seconds(naive.and_utc())))
            .map_err(|e| CoreError::InvalidTimestamp {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The calendar date of this instant in UTC.
    pub fn date(&self) -> chrono::NaiveDate {
        self.0.date_naive()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn test_parse_z_suffix() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_offset_converted_to_utc() {
        let ts = Timestamp::parse("2026-01-15T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_store_local_datetime() {
        let ts = Timestamp::parse("2026-01-15T12:00:00.123456").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
        let ts = Timestamp::parse("2026-03-01T08:15:30").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-01T08:15:30Z");
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("2026-01-15").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let later = Timestamp::parse("2026-01-15T12:00:01Z").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_serde_accepts_store_format_and_emits_z() {
        let ts: Timestamp = serde_json::from_str("\"2026-01-15T12:00:00.5\"").unwrap();
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2026-01-15T12:00:00Z\"");
    }

    #[test]
    fn test_date_projection() {
        let ts = Timestamp::parse("2026-01-15T23:59:59Z").unwrap();
        assert_eq!(ts.date(), chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }
}
