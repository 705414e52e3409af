//! Wall-Clock Timestamps
//!
//! Presence and interaction records are stamped with UTC instants. On the
//! wire they are plain milliseconds since the Unix epoch, so every record that
//! matters for stickiness (`entered_at`, `added_at`) round-trips as an integer.
//!
//! # Example
//!
//! ```
//! use area_events::{Timestamp, MILLIS_PER_HOUR};
//!
//! let entered = Timestamp::from_millis(0);
//! let now = entered.plus_millis(MILLIS_PER_HOUR / 2);
//! assert_eq!(now.millis_since(entered), MILLIS_PER_HOUR / 2);
//! assert_eq!(entered.millis_since(now), 0);
//! ```

use chrono::serde::ts_milliseconds;
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: u64 = 60 * 1000;

/// Milliseconds in one hour.
pub const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: u64 = 24 * MILLIS_PER_HOUR;

/// A UTC instant, never before the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The Unix epoch.
    pub fn epoch() -> Self {
        Self::default()
    }

    /// Creates a timestamp from milliseconds since the epoch.
    ///
    /// Values past chrono's range clamp to its latest instant.
    pub fn from_millis(millis: u64) -> Self {
        let at = i64::try_from(millis)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self(at)
    }

    /// Reads the system clock.
    ///
    /// A clock set before the epoch reads as the epoch.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Wraps a chrono instant, clamping anything before the epoch.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.max(DateTime::<Utc>::default()))
    }

    pub fn datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Milliseconds since the epoch.
    pub fn as_millis(self) -> u64 {
        u64::try_from(self.0.timestamp_millis()).unwrap_or(0)
    }

    /// Elapsed milliseconds from `earlier` to `self`, clamped at zero.
    pub fn millis_since(self, earlier: Timestamp) -> u64 {
        u64::try_from(self.0.signed_duration_since(earlier.0).num_milliseconds()).unwrap_or(0)
    }

    /// Returns a timestamp `millis` later.
    pub fn plus_millis(self, millis: u64) -> Self {
        Self::from_millis(self.as_millis().saturating_add(millis))
    }

    /// Returns a timestamp `millis` earlier, clamped at the epoch.
    pub fn minus_millis(self, millis: u64) -> Self {
        Self::from_millis(self.as_millis().saturating_sub(millis))
    }

    /// UTC hour of day (0-23).
    pub fn hour_of_day(self) -> u8 {
        self.0.hour() as u8
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::from_datetime(at)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ts_milliseconds::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ts_milliseconds::deserialize(deserializer).map(Self::from_datetime)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Error type for parsing a Timestamp from a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTimestampError(pub String);

impl fmt::Display for ParseTimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid timestamp: '{}', expected RFC 3339 or milliseconds like '1500ms'",
            self.0
        )
    }
}

impl std::error::Error for ParseTimestampError {}

impl FromStr for Timestamp {
    type Err = ParseTimestampError;

    /// Parses RFC 3339 ("2024-01-01T08:00:00Z"), "1500ms", or a bare "1500".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::from_datetime(at.with_timezone(&Utc)));
        }
        let digits = trimmed.strip_suffix("ms").unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(Self::from_millis)
            .map_err(|_| ParseTimestampError(s.to_string()))
    }
}
