//! Calendar aligner - zoned stepping for intervals with a calendar period
//!
//! Period length varies with month, leap year and DST rules, so the count of
//! elapsed periods cannot be found by division. The aligner walks the grid
//! one interval at a time in the zone's local wall-clock terms.

use chrono::{DateTime, Days, LocalResult, Months, NaiveDateTime, Offset, TimeDelta, TimeZone};
use tracing::{debug, warn};

use cadence_core::{
    CadenceError, CadenceResult, CalendarPeriod, FixedDuration, Instant, Interval, Zone,
};

/// Direction of a single grid step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Floors timestamps onto a grid of `period + duration` steps in a zone
#[derive(Clone, Debug)]
pub struct CalendarAligner {
    period: CalendarPeriod,
    duration: FixedDuration,
    zone: Zone,
    /// Upper bound on grid steps, `None` for unbounded
    max_steps: Option<u64>,
}

impl CalendarAligner {
    pub fn new(period: CalendarPeriod, duration: FixedDuration, zone: Zone) -> Self {
        CalendarAligner {
            period,
            duration,
            zone,
            max_steps: None,
        }
    }

    pub fn with_max_steps(mut self, max_steps: Option<u64>) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Greatest grid point `<= timestamp`, where the grid is
    /// `origin`, `origin + i`, `(origin + i) + i`, ... and the same walked backward
    pub fn align(&self, timestamp: Instant, origin: Instant) -> CadenceResult<Instant> {
        let interval = Interval::new(self.period, self.duration);
        interval.validate()?;
        if interval.is_zero() {
            return Ok(timestamp);
        }
        if timestamp == origin {
            return Ok(origin);
        }

        let target = timestamp.to_zoned(self.zone);
        let mut aligned = origin.to_zoned(self.zone);
        let mut steps: u64 = 0;

        if timestamp < origin {
            while aligned > target {
                aligned = self.step(&aligned, Direction::Backward)?;
                steps += 1;
                self.check_limit(steps)?;
            }
        } else {
            // Remember the last grid point instead of stepping back:
            // a calendar step backward is not always the inverse of a step forward.
            let mut previous = aligned.clone();
            while aligned < target {
                previous = aligned.clone();
                aligned = self.step(&aligned, Direction::Forward)?;
                steps += 1;
                self.check_limit(steps)?;
            }
            if aligned != target {
                aligned = previous;
            }
        }

        debug!(
            steps,
            period = %self.period,
            duration = %self.duration,
            zone = %self.zone,
            "calendar alignment complete"
        );
        Ok(Instant::from(aligned))
    }

    fn check_limit(&self, steps: u64) -> CadenceResult<()> {
        match self.max_steps {
            Some(limit) if steps > limit => {
                warn!(limit, period = %self.period, "calendar step limit exceeded");
                Err(CadenceError::StepLimitExceeded { limit })
            }
            _ => Ok(()),
        }
    }

    /// Move one interval: period on the local date-time, then duration on the timeline
    fn step(&self, at: &DateTime<Zone>, direction: Direction) -> CadenceResult<DateTime<Zone>> {
        let local = shift_local(at.naive_local(), &self.period, direction)?;
        let resolved = resolve_local(self.zone, local, at.offset().fix().local_minus_utc())?;

        let delta = self.duration.as_time_delta();
        match direction {
            Direction::Forward => resolved.checked_add_signed(delta),
            Direction::Backward => resolved.checked_sub_signed(delta),
        }
        .ok_or(CadenceError::OutOfRange)
    }
}

/// Apply the period to a wall-clock date-time.
/// Months first (day-of-month clamped to the target month's end), then days.
fn shift_local(
    local: NaiveDateTime,
    period: &CalendarPeriod,
    direction: Direction,
) -> CadenceResult<NaiveDateTime> {
    let months = u32::try_from(period.total_months()).map_err(|_| CadenceError::OutOfRange)?;
    let days = u64::try_from(period.days).map_err(|_| CadenceError::OutOfRange)?;

    let mut shifted = local;
    if months != 0 {
        shifted = match direction {
            Direction::Forward => shifted.checked_add_months(Months::new(months)),
            Direction::Backward => shifted.checked_sub_months(Months::new(months)),
        }
        .ok_or(CadenceError::OutOfRange)?;
    }
    if days != 0 {
        shifted = match direction {
            Direction::Forward => shifted.checked_add_days(Days::new(days)),
            Direction::Backward => shifted.checked_sub_days(Days::new(days)),
        }
        .ok_or(CadenceError::OutOfRange)?;
    }
    Ok(shifted)
}

/// Map a wall-clock date-time back into the zone.
///
/// In an overlap the previous offset is kept when it is one of the two
/// candidates, otherwise the earlier instant wins. In a gap the time moves
/// forward by the length of the gap.
fn resolve_local(
    zone: Zone,
    local: NaiveDateTime,
    preferred_offset_secs: i32,
) -> CadenceResult<DateTime<Zone>> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earlier, later) => {
            if later.offset().fix().local_minus_utc() == preferred_offset_secs {
                Ok(later)
            } else {
                Ok(earlier)
            }
        }
        LocalResult::None => {
            // Read the local time with the offset in force before the transition
            let probe = local
                .checked_sub_signed(TimeDelta::days(1))
                .ok_or(CadenceError::OutOfRange)?;
            let before = zone.offset_from_utc_datetime(&probe).fix().local_minus_utc();
            let utc = local
                .checked_sub_signed(TimeDelta::seconds(before as i64))
                .ok_or(CadenceError::OutOfRange)?;
            Ok(zone.from_utc_datetime(&utc))
        }
    }
}
