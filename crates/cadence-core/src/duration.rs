//! Fixed-length durations
//!
//! A `FixedDuration` has the same real-world length regardless of zone or
//! date: hours, minutes, seconds and nanoseconds. Days parsed from ISO 8601
//! text count as exactly 24 hours.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use chrono::TimeDelta;

use crate::iso::{self, NANOS_PER_DAY, NANOS_PER_HOUR, NANOS_PER_MINUTE, NANOS_PER_SECOND};
use crate::{CadenceError, CadenceResult};

/// Signed fixed-length span with nanosecond resolution
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedDuration(TimeDelta);

impl FixedDuration {
    pub const ZERO: FixedDuration = FixedDuration(TimeDelta::zero());

    /// Panics outside the representable range; see [`FixedDuration::try_from_hours`]
    #[inline]
    pub fn from_hours(hours: i64) -> Self {
        FixedDuration(TimeDelta::hours(hours))
    }

    /// Panics outside the representable range; see [`FixedDuration::try_from_minutes`]
    #[inline]
    pub fn from_minutes(minutes: i64) -> Self {
        FixedDuration(TimeDelta::minutes(minutes))
    }

    /// Panics outside the representable range; see [`FixedDuration::try_from_secs`]
    #[inline]
    pub fn from_secs(secs: i64) -> Self {
        FixedDuration(TimeDelta::seconds(secs))
    }

    /// Panics outside the representable range; see [`FixedDuration::try_from_millis`]
    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        FixedDuration(TimeDelta::milliseconds(millis))
    }

    pub fn try_from_hours(hours: i64) -> Option<Self> {
        TimeDelta::try_hours(hours).map(FixedDuration)
    }

    pub fn try_from_minutes(minutes: i64) -> Option<Self> {
        TimeDelta::try_minutes(minutes).map(FixedDuration)
    }

    pub fn try_from_secs(secs: i64) -> Option<Self> {
        TimeDelta::try_seconds(secs).map(FixedDuration)
    }

    pub fn try_from_millis(millis: i64) -> Option<Self> {
        TimeDelta::try_milliseconds(millis).map(FixedDuration)
    }

    #[inline]
    pub fn from_nanos(nanos: i64) -> Self {
        FixedDuration(TimeDelta::nanoseconds(nanos))
    }

    /// Build from a nanosecond count wider than `i64`.
    /// Returns `None` outside the representable range (about ±292 million years).
    pub fn try_from_nanos(nanos: i128) -> Option<Self> {
        let secs = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND)).ok()?;
        let subsec = nanos.rem_euclid(NANOS_PER_SECOND) as u32;
        TimeDelta::new(secs, subsec).map(FixedDuration)
    }

    #[inline]
    pub fn from_time_delta(delta: TimeDelta) -> Self {
        FixedDuration(delta)
    }

    #[inline]
    pub fn as_time_delta(self) -> TimeDelta {
        self.0
    }

    /// Total length in nanoseconds; never overflows
    #[inline]
    pub fn as_nanos(self) -> i128 {
        self.0.num_seconds() as i128 * NANOS_PER_SECOND + self.0.subsec_nanos() as i128
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0.num_milliseconds()
    }

    /// Total seconds, including the fraction
    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.as_nanos() as f64 / NANOS_PER_SECOND as f64
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < TimeDelta::zero()
    }

    #[inline]
    pub fn abs(self) -> Self {
        FixedDuration(self.0.abs())
    }

    pub fn checked_add(self, rhs: FixedDuration) -> Option<Self> {
        self.0.checked_add(&rhs.0).map(FixedDuration)
    }

    pub fn checked_sub(self, rhs: FixedDuration) -> Option<Self> {
        self.0.checked_sub(&rhs.0).map(FixedDuration)
    }

    pub fn checked_mul(self, factor: i64) -> Option<Self> {
        self.as_nanos()
            .checked_mul(factor as i128)
            .and_then(Self::try_from_nanos)
    }

    /// Parse ISO 8601 text such as `PT1H`, `PT0.5S`, `P1DT12H` or `-PT15M`
    pub fn parse(text: &str) -> CadenceResult<Self> {
        let parts = iso::tokenize(text)?;
        let mut nanos: i128 = 0;

        for component in &parts.date {
            if component.unit != 'D' {
                return Err(CadenceError::parse(
                    text,
                    "fixed durations only accept days in the date part",
                ));
            }
            nanos += iso::parse_integer(text, component.number)? as i128 * NANOS_PER_DAY;
        }
        for component in &parts.time {
            nanos += match component.unit {
                'H' => iso::parse_integer(text, component.number)? as i128 * NANOS_PER_HOUR,
                'M' => iso::parse_integer(text, component.number)? as i128 * NANOS_PER_MINUTE,
                _ => iso::parse_seconds_nanos(text, component.number)?,
            };
        }
        if parts.negative {
            nanos = -nanos;
        }

        Self::try_from_nanos(nanos)
            .ok_or_else(|| CadenceError::parse(text, "duration out of range"))
    }

    /// Format the `T...` part without the leading `P`, e.g. `T1H30M`.
    /// Each component carries its own sign, like `T-1H-30M`.
    pub(crate) fn fmt_time_part(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.as_nanos();
        if total == 0 {
            return f.write_str("T0S");
        }

        let hours = total / NANOS_PER_HOUR;
        let minutes = (total % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
        let rem = total % NANOS_PER_MINUTE;
        let secs = rem / NANOS_PER_SECOND;
        let nanos = (rem % NANOS_PER_SECOND).abs();

        f.write_str("T")?;
        if hours != 0 {
            write!(f, "{hours}H")?;
        }
        if minutes != 0 {
            write!(f, "{minutes}M")?;
        }
        if rem != 0 {
            if rem < 0 && secs == 0 {
                f.write_str("-0")?;
            } else {
                write!(f, "{secs}")?;
            }
            if nanos != 0 {
                let digits = format!("{nanos:09}");
                write!(f, ".{}", digits.trim_end_matches('0'))?;
            }
            f.write_str("S")?;
        }
        Ok(())
    }
}

/// Panics on overflow; use [`FixedDuration::checked_add`] for fallible arithmetic
impl Add for FixedDuration {
    type Output = FixedDuration;

    #[inline]
    fn add(self, rhs: FixedDuration) -> Self::Output {
        FixedDuration(self.0 + rhs.0)
    }
}

/// Panics on overflow; use [`FixedDuration::checked_sub`] for fallible arithmetic
impl Sub for FixedDuration {
    type Output = FixedDuration;

    #[inline]
    fn sub(self, rhs: FixedDuration) -> Self::Output {
        FixedDuration(self.0 - rhs.0)
    }
}

impl Neg for FixedDuration {
    type Output = FixedDuration;

    #[inline]
    fn neg(self) -> Self::Output {
        FixedDuration(-self.0)
    }
}

impl Default for FixedDuration {
    fn default() -> Self {
        FixedDuration::ZERO
    }
}

impl From<TimeDelta> for FixedDuration {
    fn from(delta: TimeDelta) -> Self {
        FixedDuration(delta)
    }
}

impl TryFrom<std::time::Duration> for FixedDuration {
    type Error = CadenceError;

    fn try_from(duration: std::time::Duration) -> CadenceResult<Self> {
        TimeDelta::from_std(duration)
            .map(FixedDuration)
            .map_err(|_| CadenceError::OutOfRange)
    }
}

impl FromStr for FixedDuration {
    type Err = CadenceError;

    fn from_str(s: &str) -> CadenceResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FixedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("P")?;
        self.fmt_time_part(f)
    }
}

impl fmt::Debug for FixedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedDuration({self})")
    }
}
