//! Composite intervals: a calendar period plus a fixed duration

use std::fmt;
use std::str::FromStr;

use crate::iso::{self, NANOS_PER_HOUR, NANOS_PER_MINUTE};
use crate::{CadenceError, CadenceResult, CalendarPeriod, FixedDuration};

/// Repeating interval used to build an alignment grid.
///
/// The period part is applied in local wall-clock terms; the duration part
/// on the absolute timeline. Either may be zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interval {
    pub period: CalendarPeriod,
    pub duration: FixedDuration,
}

impl Interval {
    pub const ZERO: Interval = Interval {
        period: CalendarPeriod::ZERO,
        duration: FixedDuration::ZERO,
    };

    pub fn new(period: CalendarPeriod, duration: FixedDuration) -> Self {
        Interval { period, duration }
    }

    pub fn from_period(period: CalendarPeriod) -> Self {
        Self::new(period, FixedDuration::ZERO)
    }

    pub fn from_duration(duration: FixedDuration) -> Self {
        Self::new(CalendarPeriod::ZERO, duration)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.period.is_zero() && self.duration.is_zero()
    }

    #[inline]
    pub fn has_period(&self) -> bool {
        !self.period.is_zero()
    }

    #[inline]
    pub fn is_duration_only(&self) -> bool {
        self.period.is_zero() && !self.duration.is_zero()
    }

    /// Reject intervals with any negative component.
    /// Negative intervals are never normalized to positive.
    pub fn validate(&self) -> CadenceResult<()> {
        if self.period.is_negative() {
            return Err(CadenceError::InvalidInterval(format!(
                "negative period {}",
                self.period
            )));
        }
        if self.duration.is_negative() {
            return Err(CadenceError::InvalidInterval(format!(
                "negative duration {}",
                self.duration
            )));
        }
        Ok(())
    }

    /// Parse ISO 8601 text such as `P1M`, `PT15M` or `P1DT12H`.
    /// The date part becomes the period, the time part the duration.
    pub fn parse(text: &str) -> CadenceResult<Self> {
        let parts = iso::tokenize(text)?;
        let period = CalendarPeriod::from_components(text, parts.negative, &parts.date)?;

        let mut nanos: i128 = 0;
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
        let duration = FixedDuration::try_from_nanos(nanos)
            .ok_or_else(|| CadenceError::parse(text, "duration out of range"))?;

        Ok(Interval { period, duration })
    }
}

impl From<FixedDuration> for Interval {
    fn from(duration: FixedDuration) -> Self {
        Interval::from_duration(duration)
    }
}

impl From<CalendarPeriod> for Interval {
    fn from(period: CalendarPeriod) -> Self {
        Interval::from_period(period)
    }
}

impl FromStr for Interval {
    type Err = CadenceError;

    fn from_str(s: &str) -> CadenceResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.period.is_zero(), self.duration.is_zero()) {
            (true, true) => f.write_str("PT0S"),
            (false, true) => write!(f, "{}", self.period),
            (true, false) => write!(f, "{}", self.duration),
            (false, false) => {
                f.write_str("P")?;
                self.period.fmt_date_part(f)?;
                self.duration.fmt_time_part(f)
            }
        }
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interval({self})")
    }
}
