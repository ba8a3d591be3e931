//! Calendar periods
//!
//! A `CalendarPeriod` counts years, months and days. Its real-world length
//! depends on the starting date and the zone it is applied in, so it can
//! only be added to a zoned date-time, never converted to a fixed duration.

use std::fmt;
use std::str::FromStr;

use crate::iso;
use crate::{CadenceError, CadenceResult};

/// Calendar-relative span in the proleptic Gregorian calendar
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CalendarPeriod {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl CalendarPeriod {
    pub const ZERO: CalendarPeriod = CalendarPeriod {
        years: 0,
        months: 0,
        days: 0,
    };

    pub fn new(years: i32, months: i32, days: i32) -> Self {
        CalendarPeriod {
            years,
            months,
            days,
        }
    }

    pub fn of_years(years: i32) -> Self {
        Self::new(years, 0, 0)
    }

    pub fn of_months(months: i32) -> Self {
        Self::new(0, months, 0)
    }

    /// Weeks as days; `None` if the day count overflows `i32`
    pub fn of_weeks(weeks: i32) -> Option<Self> {
        weeks.checked_mul(7).map(Self::of_days)
    }

    pub fn of_days(days: i32) -> Self {
        Self::new(0, 0, days)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// True if any component is negative
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.years < 0 || self.months < 0 || self.days < 0
    }

    /// Years and months folded into months
    #[inline]
    pub fn total_months(&self) -> i64 {
        self.years as i64 * 12 + self.months as i64
    }

    /// Parse ISO 8601 text such as `P100Y`, `P1M`, `P2W` or `P1Y6M15D`
    pub fn parse(text: &str) -> CadenceResult<Self> {
        let parts = iso::tokenize(text)?;
        if !parts.time.is_empty() {
            return Err(CadenceError::parse(
                text,
                "calendar periods have no time part",
            ));
        }
        Self::from_components(text, parts.negative, &parts.date)
    }

    pub(crate) fn from_components(
        text: &str,
        negative: bool,
        components: &[iso::Component<'_>],
    ) -> CadenceResult<Self> {
        let sign: i64 = if negative { -1 } else { 1 };
        let mut years: i64 = 0;
        let mut months: i64 = 0;
        let mut days: i64 = 0;

        for component in components {
            let value = iso::parse_integer(text, component.number)?;
            match component.unit {
                'Y' => years = value,
                'M' => months = value,
                'W' => days = days.saturating_add(value.saturating_mul(7)),
                _ => days = days.saturating_add(value),
            }
        }

        let narrow = |value: i64| {
            i32::try_from(value.saturating_mul(sign))
                .map_err(|_| CadenceError::parse(text, "period component out of range"))
        };
        Ok(CalendarPeriod {
            years: narrow(years)?,
            months: narrow(months)?,
            days: narrow(days)?,
        })
    }

    /// Format the date part without the leading `P`, e.g. `1Y2M3D`
    pub(crate) fn fmt_date_part(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        Ok(())
    }
}

impl FromStr for CalendarPeriod {
    type Err = CadenceError;

    fn from_str(s: &str) -> CadenceResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CalendarPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("P0D");
        }
        f.write_str("P")?;
        self.fmt_date_part(f)
    }
}

impl fmt::Debug for CalendarPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CalendarPeriod({self})")
    }
}
