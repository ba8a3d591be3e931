//! Aligner - classifies an interval and dispatches to the matching algorithm
//!
//! - Non-zero period (with or without a duration): calendar stepping in a zone
//! - Duration only: zone-independent arithmetic floor
//! - Zero interval: identity

use tracing::trace;

use cadence_core::{
    CadenceError, CadenceResult, CalendarPeriod, FixedDuration, Instant, Interval, Zone,
};

use crate::{CalendarAligner, DurationAligner};

/// Aligner configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignConfig {
    /// Upper bound on calendar grid steps; `None` walks as far as needed
    pub max_calendar_steps: Option<u64>,
    /// Upper bound on single-step corrections after the duration estimate,
    /// not counting the one step the estimate may fall short by
    pub max_correction_steps: u64,
}

impl Default for AlignConfig {
    fn default() -> Self {
        AlignConfig {
            max_calendar_steps: None,
            max_correction_steps: 4,
        }
    }
}

impl AlignConfig {
    /// Configuration that refuses calendar walks longer than `max_calendar_steps`
    pub fn bounded(max_calendar_steps: u64) -> Self {
        AlignConfig {
            max_calendar_steps: Some(max_calendar_steps),
            ..AlignConfig::default()
        }
    }
}

/// Which algorithm an interval is routed to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignPath {
    Calendar,
    Duration,
    Identity,
}

impl AlignPath {
    pub fn of(interval: &Interval) -> Self {
        if interval.has_period() {
            AlignPath::Calendar
        } else if interval.is_duration_only() {
            AlignPath::Duration
        } else {
            AlignPath::Identity
        }
    }
}

/// Floors timestamps onto interval grids anchored at an origin.
///
/// Stateless apart from its configuration; share freely across threads.
#[derive(Clone, Debug, Default)]
pub struct Aligner {
    config: AlignConfig,
}

impl Aligner {
    pub fn new() -> Self {
        Self::with_config(AlignConfig::default())
    }

    pub fn with_config(config: AlignConfig) -> Self {
        Aligner { config }
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Greatest instant `<= timestamp` reachable from `origin` by a whole
    /// number of interval steps. `zone` is required when the interval has a
    /// calendar period. All checks run before any arithmetic.
    pub fn align(
        &self,
        timestamp: Instant,
        origin: Instant,
        interval: &Interval,
        zone: Option<Zone>,
    ) -> CadenceResult<Instant> {
        interval.validate()?;

        let path = AlignPath::of(interval);
        trace!(?path, %interval, %timestamp, %origin, "aligning");

        match path {
            AlignPath::Calendar => {
                let zone = zone.ok_or(CadenceError::MissingZone)?;
                CalendarAligner::new(interval.period, interval.duration, zone)
                    .with_max_steps(self.config.max_calendar_steps)
                    .align(timestamp, origin)
            }
            AlignPath::Duration => DurationAligner::new(interval.duration)
                .with_max_correction_steps(self.config.max_correction_steps)
                .align(timestamp, origin),
            AlignPath::Identity => Ok(timestamp),
        }
    }

    /// Align to a pure fixed-length interval; no zone involved
    pub fn align_with_duration(
        &self,
        timestamp: Instant,
        origin: Instant,
        duration: FixedDuration,
    ) -> CadenceResult<Instant> {
        self.align(timestamp, origin, &Interval::from_duration(duration), None)
    }

    /// Align to a pure calendar period in `zone`
    pub fn align_with_period(
        &self,
        timestamp: Instant,
        origin: Instant,
        period: CalendarPeriod,
        zone: Zone,
    ) -> CadenceResult<Instant> {
        self.align(timestamp, origin, &Interval::from_period(period), Some(zone))
    }
}

/// [`Aligner::align`] with the default configuration
pub fn align(
    timestamp: Instant,
    origin: Instant,
    interval: &Interval,
    zone: Option<Zone>,
) -> CadenceResult<Instant> {
    Aligner::default().align(timestamp, origin, interval, zone)
}

/// [`Aligner::align_with_duration`] with the default configuration
pub fn align_with_duration(
    timestamp: Instant,
    origin: Instant,
    duration: FixedDuration,
) -> CadenceResult<Instant> {
    Aligner::default().align_with_duration(timestamp, origin, duration)
}

/// [`Aligner::align_with_period`] with the default configuration
pub fn align_with_period(
    timestamp: Instant,
    origin: Instant,
    period: CalendarPeriod,
    zone: Zone,
) -> CadenceResult<Instant> {
    Aligner::default().align_with_period(timestamp, origin, period, zone)
}
