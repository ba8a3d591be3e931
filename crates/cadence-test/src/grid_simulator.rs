//! Grid Simulator - randomized alignment trials checked against invariants
//!
//! Simulates:
//! - Random timestamps around an origin, before and after it
//! - Fixed-duration, calendar and mixed intervals
//! - Zones with and without daylight saving transitions
//! - Invariant checks against the reference oracle

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use cadence_core::{CadenceError, FixedDuration, Instant, Interval, Zone, UTC};
use cadence_time::{AlignConfig, AlignPath, Aligner};

use crate::oracle;

/// Oracle walks give up after this many grid points
const ORACLE_MAX_POINTS: usize = 100_000;

/// One interval under test and the range of timestamps drawn for it
#[derive(Clone, Debug)]
pub struct GridCase {
    pub interval: Interval,
    pub zone: Zone,
    /// Timestamps are drawn uniformly from `origin ± span`
    pub span: FixedDuration,
}

impl GridCase {
    pub fn new(interval: Interval, zone: Zone, span: FixedDuration) -> Self {
        GridCase {
            interval,
            zone,
            span,
        }
    }

    /// Duration-only case spanning `span_days` on each side of the origin
    pub fn fixed(duration: FixedDuration, span_days: i64) -> Self {
        Self::new(
            Interval::from_duration(duration),
            UTC,
            FixedDuration::from_hours(span_days * 24),
        )
    }

    pub fn calendar(interval: Interval, zone: Zone, span_days: i64) -> Self {
        Self::new(interval, zone, FixedDuration::from_hours(span_days * 24))
    }
}

/// Randomized alignment run over a set of grid cases
pub struct GridSimulator {
    aligner: Aligner,
    origin: Instant,
    cases: Vec<GridCase>,
    rng: StdRng,
}

impl GridSimulator {
    pub fn new(origin: Instant, seed: u64) -> Self {
        Self::with_config(origin, AlignConfig::default(), seed)
    }

    pub fn with_config(origin: Instant, config: AlignConfig, seed: u64) -> Self {
        GridSimulator {
            aligner: Aligner::with_config(config),
            origin,
            cases: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn add_case(&mut self, case: GridCase) {
        self.cases.push(case);
    }

    pub fn cases(&self) -> &[GridCase] {
        &self.cases
    }

    /// Run `trials` random timestamps against every case
    pub fn run(&mut self, trials: usize) -> SimulationResult {
        let mut result = SimulationResult::new();
        let cases = self.cases.clone();

        for case in &cases {
            for _ in 0..trials {
                let timestamp = self.random_timestamp(case.span);
                self.trial(case, timestamp, &mut result);
            }
        }

        debug!(
            trials = result.total_trials,
            violations = result.violations(),
            "grid simulation finished"
        );
        result
    }

    fn random_timestamp(&mut self, span: FixedDuration) -> Instant {
        let span_ns = i64::try_from(span.as_nanos()).unwrap_or(i64::MAX);
        let offset = self.rng.gen_range(-span_ns..=span_ns);
        self.origin
            .checked_add(FixedDuration::from_nanos(offset))
            .unwrap_or(self.origin)
    }

    fn trial(&self, case: &GridCase, timestamp: Instant, result: &mut SimulationResult) {
        result.total_trials += 1;
        let align = |ts: Instant| self.aligner.align(ts, self.origin, &case.interval, Some(case.zone));

        let aligned = match align(timestamp) {
            Ok(aligned) => aligned,
            Err(err) => {
                result.record_error(err);
                return;
            }
        };

        if aligned > timestamp {
            result.floor_violations += 1;
        }
        if align(aligned).ok() != Some(aligned) {
            result.idempotence_violations += 1;
        }

        match AlignPath::of(&case.interval) {
            AlignPath::Duration => {
                let step = case.interval.duration;
                let offset = aligned.duration_since(self.origin).as_nanos();
                if offset % step.as_nanos() != 0 {
                    result.congruence_violations += 1;
                }
                if oracle::duration_floor(timestamp, self.origin, step) != Some(aligned) {
                    result.oracle_mismatches += 1;
                }
                self.check_direction(case, aligned, result);
            }
            AlignPath::Calendar if case.zone == UTC => {
                let expected = oracle::calendar_floor_utc(
                    timestamp,
                    self.origin,
                    case.interval.period,
                    case.interval.duration,
                    ORACLE_MAX_POINTS,
                );
                if expected != Some(aligned) {
                    result.oracle_mismatches += 1;
                }
            }
            AlignPath::Calendar if case.interval.duration.is_zero() => {
                // Walks that meet a skipped or repeated local time have no reference answer
                let expected = oracle::calendar_floor_zoned(
                    timestamp,
                    self.origin,
                    case.interval.period,
                    case.zone,
                    ORACLE_MAX_POINTS,
                );
                if expected.is_some_and(|expected| expected != aligned) {
                    result.oracle_mismatches += 1;
                }
                if expected.is_some() {
                    result.zoned_references += 1;
                }
            }
            _ => {}
        }
    }

    /// Just short of the next boundary stays put; the next boundary advances
    fn check_direction(&self, case: &GridCase, aligned: Instant, result: &mut SimulationResult) {
        let step = case.interval.duration;
        let next = match aligned.checked_add(step) {
            Some(next) => next,
            None => return,
        };
        let just_before = next - FixedDuration::from_nanos(1);
        let align = |ts: Instant| self.aligner.align(ts, self.origin, &case.interval, None).ok();

        if align(just_before) != Some(aligned) || align(next) != Some(next) {
            result.direction_violations += 1;
        }
    }
}

/// Simulation result and statistics
#[derive(Debug, Default)]
pub struct SimulationResult {
    /// Total trials executed
    pub total_trials: u64,
    /// Aligned value later than its timestamp
    pub floor_violations: u64,
    /// Re-aligning an aligned value moved it
    pub idempotence_violations: u64,
    /// Duration offsets that are not whole multiples of the step
    pub congruence_violations: u64,
    /// Boundary neighbours that aligned to the wrong grid point
    pub direction_violations: u64,
    /// Disagreements with the reference oracle
    pub oracle_mismatches: u64,
    /// Non-UTC calendar trials that had a reference answer to compare against
    pub zoned_references: u64,
    /// Alignments that returned an error
    pub errors: Vec<CadenceError>,
}

impl SimulationResult {
    pub fn new() -> Self {
        SimulationResult::default()
    }

    fn record_error(&mut self, err: CadenceError) {
        self.errors.push(err);
    }

    /// Total invariant violations, errors included
    pub fn violations(&self) -> u64 {
        self.floor_violations
            + self.idempotence_violations
            + self.congruence_violations
            + self.direction_violations
            + self.oracle_mismatches
            + self.errors.len() as u64
    }

    pub fn is_clean(&self) -> bool {
        self.violations() == 0
    }
}

/// Predefined test scenarios
pub mod scenarios {
    use super::*;
    use cadence_core::CalendarPeriod;

    fn origin() -> Instant {
        Instant::from_unix_nanos(946_684_800_000_000_000) // 2000-01-01T00:00:00Z
    }

    /// Hour, minute, second and sub-second grids
    pub fn fixed_grids() -> GridSimulator {
        let mut sim = GridSimulator::new(origin(), 1);
        sim.add_case(GridCase::fixed(FixedDuration::from_hours(1), 3650));
        sim.add_case(GridCase::fixed(FixedDuration::from_hours(3), 3650));
        sim.add_case(GridCase::fixed(FixedDuration::from_minutes(7), 365));
        sim.add_case(GridCase::fixed(FixedDuration::from_secs(5), 30));
        sim.add_case(GridCase::fixed(FixedDuration::from_millis(500), 1));
        sim.add_case(GridCase::fixed(FixedDuration::from_nanos(7), 1));
        sim
    }

    /// Month, year and day grids in UTC
    pub fn utc_calendar() -> GridSimulator {
        let mut sim = GridSimulator::new(origin(), 2);
        sim.add_case(GridCase::calendar(CalendarPeriod::of_months(1).into(), UTC, 3650));
        sim.add_case(GridCase::calendar(CalendarPeriod::of_years(1).into(), UTC, 36500));
        sim.add_case(GridCase::calendar(CalendarPeriod::of_days(3).into(), UTC, 730));
        sim.add_case(GridCase::calendar(
            Interval::new(CalendarPeriod::of_days(1), FixedDuration::from_hours(1)),
            UTC,
            365,
        ));
        sim
    }

    /// Day and month grids in zones that observe daylight saving
    pub fn dst_zones() -> GridSimulator {
        let mut sim = GridSimulator::new(origin(), 3);
        for zone in [chrono_tz::Europe::Berlin, chrono_tz::America::New_York] {
            sim.add_case(GridCase::calendar(CalendarPeriod::of_days(1).into(), zone, 730));
            sim.add_case(GridCase::calendar(CalendarPeriod::of_months(1).into(), zone, 3650));
        }
        sim
    }
}
