//! Property-based tests for alignment invariants.
//!
//! Every property is checked on random origins, timestamps and intervals,
//! with the oracle as the reference answer where one exists.

use proptest::prelude::*;

use cadence_core::{CalendarPeriod, FixedDuration, Instant, Interval, UTC};
use cadence_time::{align, align_with_duration, align_with_period};

use crate::oracle;

const NANOS_PER_DAY: i64 = 86_400_000_000_000;

/// Origins between roughly 1900 and 2100
fn origin_strategy() -> impl Strategy<Value = Instant> {
    (-25_000i64..47_000, 0i64..NANOS_PER_DAY).prop_map(|(days, nanos)| {
        Instant::from_unix_nanos(0)
            + FixedDuration::from_hours(days * 24)
            + FixedDuration::from_nanos(nanos)
    })
}

/// Signed offset of at most `days` days
fn offset_strategy(days: i64) -> impl Strategy<Value = FixedDuration> {
    (-days * NANOS_PER_DAY..=days * NANOS_PER_DAY).prop_map(FixedDuration::from_nanos)
}

/// Positive durations from one nanosecond to one week
fn duration_strategy() -> impl Strategy<Value = FixedDuration> {
    prop_oneof![
        (1i64..1_000).prop_map(FixedDuration::from_nanos),
        (1i64..10_000).prop_map(FixedDuration::from_millis),
        (1i64..3_600).prop_map(FixedDuration::from_secs),
        (1i64..168).prop_map(FixedDuration::from_hours),
    ]
}

fn period_strategy() -> impl Strategy<Value = CalendarPeriod> {
    prop_oneof![
        (1i32..5).prop_map(CalendarPeriod::of_years),
        (1i32..24).prop_map(CalendarPeriod::of_months),
        (1i32..40).prop_map(CalendarPeriod::of_days),
        (0i32..3, 1i32..12, 0i32..20).prop_map(|(y, m, d)| CalendarPeriod::new(y, m, d)),
    ]
}

proptest! {
    /// Property: the result never exceeds the timestamp.
    #[test]
    fn prop_duration_floor(
        origin in origin_strategy(),
        offset in offset_strategy(3650),
        step in duration_strategy(),
    ) {
        let timestamp = origin + offset;
        let aligned = align_with_duration(timestamp, origin, step).unwrap();
        prop_assert!(aligned <= timestamp);
        prop_assert!(timestamp.duration_since(aligned) < step);
    }

    /// Property: aligned offsets are whole multiples of the step and match the closed form.
    #[test]
    fn prop_duration_congruent_with_oracle(
        origin in origin_strategy(),
        offset in offset_strategy(3650),
        step in duration_strategy(),
    ) {
        let timestamp = origin + offset;
        let aligned = align_with_duration(timestamp, origin, step).unwrap();
        prop_assert_eq!(aligned.duration_since(origin).as_nanos() % step.as_nanos(), 0);
        prop_assert_eq!(Some(aligned), oracle::duration_floor(timestamp, origin, step));
    }

    /// Property: aligning an aligned value returns it unchanged.
    #[test]
    fn prop_duration_idempotent(
        origin in origin_strategy(),
        offset in offset_strategy(3650),
        step in duration_strategy(),
    ) {
        let aligned = align_with_duration(origin + offset, origin, step).unwrap();
        prop_assert_eq!(align_with_duration(aligned, origin, step).unwrap(), aligned);
    }

    /// Property: less than one step past a boundary stays there, exactly one step moves on.
    #[test]
    fn prop_duration_directional(
        origin in origin_strategy(),
        offset in offset_strategy(3650),
        step in duration_strategy(),
        fraction in 0.0f64..1.0,
    ) {
        let aligned = align_with_duration(origin + offset, origin, step).unwrap();
        let within = (step.as_nanos() as f64 * fraction) as i64;
        let within = within.min(step.as_nanos() as i64 - 1);

        let nearby = aligned + FixedDuration::from_nanos(within);
        prop_assert_eq!(align_with_duration(nearby, origin, step).unwrap(), aligned);
        prop_assert_eq!(align_with_duration(aligned + step, origin, step).unwrap(), aligned + step);
    }

    /// Property: the origin is always on its own grid.
    #[test]
    fn prop_identity_at_origin(
        origin in origin_strategy(),
        step in duration_strategy(),
        period in period_strategy(),
    ) {
        prop_assert_eq!(align_with_duration(origin, origin, step).unwrap(), origin);
        prop_assert_eq!(align_with_period(origin, origin, period, UTC).unwrap(), origin);
        let mixed = Interval::new(period, step);
        prop_assert_eq!(align(origin, origin, &mixed, Some(UTC)).unwrap(), origin);
    }

    /// Property: a zero interval returns the timestamp unchanged.
    #[test]
    fn prop_zero_interval_identity(
        origin in origin_strategy(),
        offset in offset_strategy(36500),
    ) {
        let timestamp = origin + offset;
        prop_assert_eq!(align(timestamp, origin, &Interval::ZERO, None).unwrap(), timestamp);
        prop_assert_eq!(align(timestamp, origin, &Interval::ZERO, Some(UTC)).unwrap(), timestamp);
    }

    /// Property: UTC calendar alignment agrees with the naive walk and is idempotent.
    #[test]
    fn prop_calendar_matches_oracle(
        origin in origin_strategy(),
        offset in offset_strategy(3650),
        period in period_strategy(),
    ) {
        let timestamp = origin + offset;
        let aligned = align_with_period(timestamp, origin, period, UTC).unwrap();
        prop_assert!(aligned <= timestamp);
        prop_assert_eq!(align_with_period(aligned, origin, period, UTC).unwrap(), aligned);

        let expected = oracle::calendar_floor_utc(timestamp, origin, period, FixedDuration::ZERO, 10_000);
        prop_assert_eq!(Some(aligned), expected);
    }
}
