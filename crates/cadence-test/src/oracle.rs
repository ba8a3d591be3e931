//! Reference oracle - slow, obviously-correct alignment used to check the engine
//!
//! - Duration grids: closed-form floor division over exact nanoseconds
//! - Calendar grids in UTC: naive walk over every grid point
//! - Calendar grids in other zones: chrono's own zoned month/day arithmetic

use chrono::{Days, Months, NaiveDateTime};

use cadence_core::{CalendarPeriod, FixedDuration, Instant, Zone};

/// `origin + floor((timestamp - origin) / step) * step`, `None` on overflow
/// or a non-positive step
pub fn duration_floor(timestamp: Instant, origin: Instant, step: FixedDuration) -> Option<Instant> {
    let step_ns = step.as_nanos();
    if step_ns <= 0 {
        return None;
    }
    let delta = timestamp.duration_since(origin).as_nanos();
    let offset = delta.div_euclid(step_ns).checked_mul(step_ns)?;
    origin.checked_add(FixedDuration::try_from_nanos(offset)?)
}

/// Greatest point of the UTC calendar grid `<= timestamp`.
///
/// Grid points are built by repeated application of `period` then `duration`
/// on naive UTC date-times, forward for later timestamps and backward for
/// earlier ones. `None` if the walk overflows or exceeds `max_points`.
pub fn calendar_floor_utc(
    timestamp: Instant,
    origin: Instant,
    period: CalendarPeriod,
    duration: FixedDuration,
    max_points: usize,
) -> Option<Instant> {
    let target = timestamp.as_datetime().naive_utc();
    let mut point = origin.as_datetime().naive_utc();

    if target >= point {
        let mut floor = point;
        for _ in 0..max_points {
            if point > target {
                return Some(naive_instant(floor));
            }
            floor = point;
            point = forward(point, period, duration)?;
        }
    } else {
        for _ in 0..max_points {
            if point <= target {
                return Some(naive_instant(point));
            }
            point = backward(point, period, duration)?;
        }
    }
    None
}

/// Greatest point of a pure calendar grid in `zone` that is `<= timestamp`.
///
/// Walks with chrono's zoned `checked_add_months`/`checked_add_days`, which
/// refuse wall-clock times that are skipped or repeated. `None` when the walk
/// meets such a time, overflows or exceeds `max_points`, so only walks that
/// never touch a transition get an answer.
pub fn calendar_floor_zoned(
    timestamp: Instant,
    origin: Instant,
    period: CalendarPeriod,
    zone: Zone,
    max_points: usize,
) -> Option<Instant> {
    let months = Months::new(u32::try_from(period.total_months()).ok()?);
    let days = Days::new(u64::try_from(period.days).ok()?);
    let target = timestamp.to_zoned(zone);
    let mut point = origin.to_zoned(zone);

    if target >= point {
        let mut floor = point.clone();
        for _ in 0..max_points {
            if point > target {
                return Some(Instant::from(floor));
            }
            floor = point.clone();
            point = point.checked_add_months(months)?.checked_add_days(days)?;
        }
    } else {
        for _ in 0..max_points {
            if point <= target {
                return Some(Instant::from(point));
            }
            point = point.checked_sub_months(months)?.checked_sub_days(days)?;
        }
    }
    None
}

fn forward(point: NaiveDateTime, period: CalendarPeriod, duration: FixedDuration) -> Option<NaiveDateTime> {
    let months = u32::try_from(period.total_months()).ok()?;
    let days = u64::try_from(period.days).ok()?;
    point
        .checked_add_months(Months::new(months))?
        .checked_add_days(Days::new(days))?
        .checked_add_signed(duration.as_time_delta())
}

fn backward(point: NaiveDateTime, period: CalendarPeriod, duration: FixedDuration) -> Option<NaiveDateTime> {
    let months = u32::try_from(period.total_months()).ok()?;
    let days = u64::try_from(period.days).ok()?;
    point
        .checked_sub_months(Months::new(months))?
        .checked_sub_days(Days::new(days))?
        .checked_sub_signed(duration.as_time_delta())
}

fn naive_instant(point: NaiveDateTime) -> Instant {
    Instant::from(point.and_utc())
}
