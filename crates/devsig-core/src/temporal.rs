//! # Temporal Types
//!
//! UTC-only timestamp for signature records. The wire format carries whole
//! seconds since the Unix epoch as a signed 64-bit integer, so subsecond
//! precision is dropped on construction rather than at encode time. That
//! keeps `decode(encode(t)) == t` for every value this type can hold.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC timestamp with second-level precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time, truncated to seconds.
    pub fn now() -> Self {
        let now = Utc::now();
        Self::from_unix(now.timestamp()).unwrap_or(Self(now))
    }

    /// Build from seconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidTimestamp`] if chrono cannot represent it.
    pub fn from_unix(secs: i64) -> Result<Self, ValidationError> {
        Utc.timestamp_opt(secs, 0)
            .single()
            .map(Self)
            .ok_or(ValidationError::InvalidTimestamp(secs))
    }

    /// Seconds since the Unix epoch.
    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// `YYYY-MM-DD HH:MM:SS`, the form printed by the generators.
    pub fn to_display_string(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// ISO 8601 with `Z` suffix, used in JSON inspection output.
    pub fn to_rfc3339(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_unix_roundtrips() {
        let ts = Timestamp::from_unix(1_500_000_000).unwrap();
        assert_eq!(ts.unix(), 1_500_000_000);
        assert_eq!(ts.to_display_string(), "2017-07-14 02:40:00");
        assert_eq!(ts.to_rfc3339(), "2017-07-14T02:40:00Z");
    }

    #[test]
    fn negative_timestamps_are_valid() {
        let ts = Timestamp::from_unix(-1).unwrap();
        assert_eq!(ts.to_display_string(), "1969-12-31 23:59:59");
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert_eq!(
            Timestamp::from_unix(i64::MAX),
            Err(ValidationError::InvalidTimestamp(i64::MAX))
        );
    }

    #[test]
    fn now_has_no_subsecond_part() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().timestamp_subsec_nanos(), 0);
    }
}
