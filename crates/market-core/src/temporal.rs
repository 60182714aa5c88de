//! # Temporal Types — UTC-Only Timestamps
//!
//! `Timestamp` is UTC with seconds precision. Delivery, payment, and
//! completion times are compared against grace periods measured in whole
//! days, so sub-second components carry no meaning and are discarded at
//! construction.
//!
//! Non-UTC inputs are rejected by [`Timestamp::parse()`].

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// Only the `Z` suffix is accepted. Explicit offsets, including
    /// `+00:00`, are rejected. Fractional seconds are truncated.
    pub fn parse(s: &str) -> Result<Self, MarketError> {
        if !s.ends_with('Z') {
            return Err(MarketError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            MarketError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Whether at least `days` whole days have passed between `self` and `now`.
    ///
    /// Returns `false` when `now` precedes `self`.
    pub fn days_elapsed_since(&self, now: Timestamp, days: u32) -> bool {
        now.0 - self.0 >= Duration::days(i64::from(days))
    }

    /// This timestamp shifted forward by `days` whole days, or `None` if the
    /// result is out of range.
    pub fn plus_days(&self, days: u32) -> Option<Self> {
        self.0
            .checked_add_signed(Duration::days(i64::from(days)))
            .map(Self)
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

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_has_no_subseconds() {
        let json = serde_json::to_string(&Timestamp::now()).unwrap();
        assert!(!json.contains('.'), "{json}");
    }

    #[test]
    fn test_parse_truncates_fraction() {
        let ts = Timestamp::parse("2026-03-02T09:15:30.987654321Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-02T09:15:30Z");
        assert_eq!(ts, Timestamp::parse("2026-03-02T09:15:30Z").unwrap());
    }

    #[test]
    fn test_parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_offsets_rejected() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T17:00:00+05:00").is_err());
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_days_elapsed_boundary() {
        let delivered = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let almost = Timestamp::parse("2026-01-07T23:59:59Z").unwrap();
        let exactly = Timestamp::parse("2026-01-08T00:00:00Z").unwrap();
        assert!(!delivered.days_elapsed_since(almost, 7));
        assert!(delivered.days_elapsed_since(exactly, 7));
    }

    #[test]
    fn test_days_elapsed_clock_skew_is_false() {
        let delivered = Timestamp::parse("2026-01-08T00:00:00Z").unwrap();
        let earlier = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        assert!(!delivered.days_elapsed_since(earlier, 1));
        assert!(delivered.days_elapsed_since(delivered, 0));
    }

    #[test]
    fn test_plus_days() {
        let ts = Timestamp::parse("2026-02-27T10:00:00Z").unwrap();
        assert_eq!(ts.plus_days(2).unwrap().to_iso8601(), "2026-03-01T10:00:00Z");
    }

    #[test]
    fn test_serde_is_rfc3339_string() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2026-01-15T12:00:00Z\"");
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ts);
    }
}
