//! UTC timestamp used for order creation and update times.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC instant, serialized as RFC 3339 with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse an RFC 3339 string, normalizing the offset to UTC.
    ///
    /// # Errors
    ///
    /// Returns error if the string is not a valid RFC 3339 timestamp.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        let dt = DateTime::parse_from_rfc3339(s)?;
        Ok(Self(dt.with_timezone(&Utc)))
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_offset() {
        let ts = Timestamp::parse("2026-01-19T14:00:00+02:00").unwrap();
        assert_eq!(ts.to_string(), "2026-01-19T12:00:00.000Z");
    }

    #[test]
    fn parse_invalid() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn ordering_follows_time() {
        let earlier = Timestamp::parse("2026-01-19T12:00:00Z").unwrap();
        let later = Timestamp::parse("2026-01-19T12:00:01Z").unwrap();
        assert!(earlier < later);
        assert_eq!(later.unix_millis() - earlier.unix_millis(), 1000);
    }

    #[test]
    fn from_datetime() {
        let dt = Utc::now();
        let ts: Timestamp = dt.into();
        assert_eq!(ts.as_datetime(), dt);
    }
}
