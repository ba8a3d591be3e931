//! Absolute points in time

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::{CadenceError, CadenceResult, FixedDuration, Zone};

/// Absolute point on the UTC timeline with nanosecond resolution.
///
/// Covers chrono's range (roughly years -262143 to 262142), wide enough for
/// centuries-long alignment grids.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(DateTime<Utc>);

impl Instant {
    pub const UNIX_EPOCH: Instant = Instant(DateTime::<Utc>::UNIX_EPOCH);

    /// Parse an RFC 3339 timestamp such as `2000-01-01T01:23:45.567Z`
    pub fn parse_rfc3339(text: &str) -> CadenceResult<Self> {
        DateTime::parse_from_rfc3339(text)
            .map(|dt| Instant(dt.with_timezone(&Utc)))
            .map_err(|e| CadenceError::parse(text, e.to_string()))
    }

    #[inline]
    pub fn from_unix_nanos(nanos: i64) -> Self {
        Instant(DateTime::from_timestamp_nanos(nanos))
    }

    pub fn from_unix_millis(millis: i64) -> CadenceResult<Self> {
        DateTime::from_timestamp_millis(millis)
            .map(Instant)
            .ok_or(CadenceError::OutOfRange)
    }

    #[inline]
    pub fn unix_millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    #[inline]
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    pub fn checked_add(self, duration: FixedDuration) -> Option<Self> {
        self.0
            .checked_add_signed(duration.as_time_delta())
            .map(Instant)
    }

    pub fn checked_sub(self, duration: FixedDuration) -> Option<Self> {
        self.0
            .checked_sub_signed(duration.as_time_delta())
            .map(Instant)
    }

    /// Signed elapsed time from `earlier` to `self`; negative if `earlier` is later
    #[inline]
    pub fn duration_since(self, earlier: Instant) -> FixedDuration {
        FixedDuration::from_time_delta(self.0.signed_duration_since(earlier.0))
    }

    /// Local wall-clock view in `zone`
    #[inline]
    pub fn to_zoned(self, zone: Zone) -> DateTime<Zone> {
        self.0.with_timezone(&zone)
    }

    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Instant {
    fn from(dt: DateTime<Tz>) -> Self {
        Instant(dt.with_timezone(&Utc))
    }
}

impl From<Instant> for DateTime<Utc> {
    fn from(instant: Instant) -> Self {
        instant.0
    }
}

/// Panics on overflow; use [`Instant::checked_add`] for fallible arithmetic
impl Add<FixedDuration> for Instant {
    type Output = Instant;

    #[inline]
    fn add(self, rhs: FixedDuration) -> Self::Output {
        Instant(self.0 + rhs.as_time_delta())
    }
}

/// Panics on overflow; use [`Instant::checked_sub`] for fallible arithmetic
impl Sub<FixedDuration> for Instant {
    type Output = Instant;

    #[inline]
    fn sub(self, rhs: FixedDuration) -> Self::Output {
        Instant(self.0 - rhs.as_time_delta())
    }
}

impl Sub<Instant> for Instant {
    type Output = FixedDuration;

    #[inline]
    fn sub(self, rhs: Instant) -> Self::Output {
        self.duration_since(rhs)
    }
}

impl FromStr for Instant {
    type Err = CadenceError;

    fn from_str(s: &str) -> CadenceResult<Self> {
        Self::parse_rfc3339(s)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instant({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let instant = Instant::parse_rfc3339("2000-01-01T01:23:45.567Z").unwrap();
        assert_eq!(instant.as_datetime().timestamp_subsec_nanos(), 567_000_000);
        assert_eq!(instant.to_string(), "2000-01-01T01:23:45.567Z");

        let offset = Instant::parse_rfc3339("2000-01-01T02:00:00+02:00").unwrap();
        assert_eq!(offset, Instant::parse_rfc3339("2000-01-01T00:00:00Z").unwrap());
    }

    #[test]
    fn test_parse_failure_names_input() {
        match Instant::parse_rfc3339("2000-13-01T00:00:00Z") {
            Err(CadenceError::Parse { input, .. }) => assert_eq!(input, "2000-13-01T00:00:00Z"),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!("yesterday".parse::<Instant>().is_err());
    }

    #[test]
    fn test_far_range() {
        let past = Instant::parse_rfc3339("1900-01-01T00:00:00Z").unwrap();
        let future = Instant::parse_rfc3339("4123-12-03T15:53:58Z").unwrap();
        assert!(past < Instant::UNIX_EPOCH);
        assert!(future.duration_since(past) > FixedDuration::ZERO);
        assert!(past.duration_since(future).is_negative());
    }

    #[test]
    fn test_duration_arithmetic() {
        let start = Instant::from_unix_millis(1_000).unwrap();
        let later = start + FixedDuration::from_millis(250);
        assert_eq!(later.unix_millis(), 1_250);
        assert_eq!(later - start, FixedDuration::from_millis(250));
        assert_eq!(later - FixedDuration::from_millis(250), start);
        assert_eq!(Instant::from_unix_nanos(1_500_000).unix_millis(), 1);
    }
}
