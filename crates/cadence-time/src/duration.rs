//! Duration aligner - zone-independent floor for fixed-length intervals

use tracing::{trace, warn};

use cadence_core::{CadenceError, CadenceResult, FixedDuration, Instant};

/// Steps the `beats - 1` jump can leave between it and the floor
const ESTIMATE_SHORTFALL: u64 = 1;

/// Floors timestamps onto a grid of fixed-length steps.
///
/// Jumps close to the answer with integer division, then corrects with a
/// bounded number of single steps.
#[derive(Clone, Debug)]
pub struct DurationAligner {
    interval: FixedDuration,
    /// Upper bound on correction steps beyond the first after the jump
    max_correction_steps: u64,
}

impl DurationAligner {
    pub fn new(interval: FixedDuration) -> Self {
        DurationAligner {
            interval,
            max_correction_steps: 4,
        }
    }

    pub fn with_max_correction_steps(mut self, max_correction_steps: u64) -> Self {
        self.max_correction_steps = max_correction_steps;
        self
    }

    pub fn interval(&self) -> FixedDuration {
        self.interval
    }

    /// Greatest `origin + n * interval <= timestamp` for integer `n`
    pub fn align(&self, timestamp: Instant, origin: Instant) -> CadenceResult<Instant> {
        if self.interval.is_negative() {
            return Err(CadenceError::InvalidInterval(format!(
                "negative duration {}",
                self.interval
            )));
        }
        if self.interval.is_zero() {
            return Ok(timestamp);
        }
        if timestamp == origin {
            return Ok(origin);
        }

        let step = self.interval.as_nanos();
        let delta = timestamp.duration_since(origin).as_nanos();
        let beats = delta.abs() / step;

        let mut corrections: u64 = 0;
        let aligned = if timestamp < origin {
            // origin - beats * step is never before the timestamp
            let mut aligned = origin
                .checked_sub(self.multiple(beats)?)
                .ok_or(CadenceError::OutOfRange)?;
            while aligned > timestamp {
                aligned = aligned
                    .checked_sub(self.interval)
                    .ok_or(CadenceError::OutOfRange)?;
                corrections += 1;
                self.check_limit(corrections)?;
            }
            aligned
        } else {
            // Start one beat short so the walk never begins past the timestamp
            let mut aligned = origin
                .checked_add(self.multiple((beats - 1).max(0))?)
                .ok_or(CadenceError::OutOfRange)?;
            // A next step past the representable range leaves the current point as the floor
            while let Some(next) = aligned.checked_add(self.interval) {
                if next > timestamp {
                    break;
                }
                aligned = next;
                corrections += 1;
                self.check_limit(corrections)?;
            }
            aligned
        };

        trace!(beats = %beats, corrections, interval = %self.interval, "duration alignment complete");
        Ok(aligned)
    }

    fn multiple(&self, factor: i128) -> CadenceResult<FixedDuration> {
        self.interval
            .as_nanos()
            .checked_mul(factor)
            .and_then(FixedDuration::try_from_nanos)
            .ok_or(CadenceError::OutOfRange)
    }

    /// Only steps beyond the one the estimate may fall short by count against the limit
    fn check_limit(&self, corrections: u64) -> CadenceResult<()> {
        if corrections.saturating_sub(ESTIMATE_SHORTFALL) > self.max_correction_steps {
            warn!(
                limit = self.max_correction_steps,
                interval = %self.interval,
                "duration correction limit exceeded"
            );
            return Err(CadenceError::StepLimitExceeded {
                limit: self.max_correction_steps,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> Instant {
        Instant::parse_rfc3339(text).unwrap()
    }

    fn floor(timestamp: &str, interval: &str) -> Instant {
        DurationAligner::new(FixedDuration::parse(interval).unwrap())
            .align(at(timestamp), at("2000-01-01T00:00:00Z"))
            .unwrap()
    }

    #[test]
    fn test_hour_intervals() {
        assert_eq!(floor("2000-01-01T01:23:45Z", "PT1H"), at("2000-01-01T01:00:00Z"));
        assert_eq!(floor("2000-01-01T05:23:45Z", "PT2H"), at("2000-01-01T04:00:00Z"));
        assert_eq!(floor("2000-01-01T05:23:45Z", "PT3H"), at("2000-01-01T03:00:00Z"));
    }

    #[test]
    fn test_minute_intervals() {
        assert_eq!(floor("2000-01-01T01:23:45Z", "PT1M"), at("2000-01-01T01:23:00Z"));
        assert_eq!(floor("2000-01-01T05:23:45Z", "PT2M"), at("2000-01-01T05:22:00Z"));
        assert_eq!(floor("2000-01-01T07:23:45Z", "PT3M"), at("2000-01-01T07:21:00Z"));
    }

    #[test]
    fn test_second_intervals() {
        assert_eq!(floor("2000-01-01T01:23:45Z", "PT1S"), at("2000-01-01T01:23:45Z"));
        assert_eq!(floor("2000-01-01T05:23:45Z", "PT2S"), at("2000-01-01T05:23:44Z"));
        assert_eq!(floor("2000-01-01T07:23:47Z", "PT5S"), at("2000-01-01T07:23:45Z"));
    }

    #[test]
    fn test_sub_second_intervals() {
        let reference = "2000-01-01T01:23:45.567Z";
        assert_eq!(floor(reference, "PT0.1S"), at("2000-01-01T01:23:45.500Z"));
        assert_eq!(floor(reference, "PT0.2S"), at("2000-01-01T01:23:45.400Z"));
        assert_eq!(floor(reference, "PT0.5S"), at("2000-01-01T01:23:45.500Z"));
    }

    #[test]
    fn test_before_origin() {
        assert_eq!(floor("1999-12-31T22:30:00Z", "PT1H"), at("1999-12-31T22:00:00Z"));
        assert_eq!(floor("1999-12-31T23:00:00Z", "PT1H"), at("1999-12-31T23:00:00Z"));
        assert_eq!(floor("1999-12-31T23:59:59.999Z", "PT1S"), at("1999-12-31T23:59:59Z"));
        assert_eq!(floor("1973-12-03T15:53:58Z", "PT24H"), at("1973-12-03T00:00:00Z"));
    }

    #[test]
    fn test_trivial_cases() {
        let origin = at("2000-01-01T00:00:00Z");
        let aligner = DurationAligner::new(FixedDuration::from_hours(1));
        assert_eq!(aligner.align(origin, origin).unwrap(), origin);

        let ts = at("2000-01-01T01:23:45Z");
        assert_eq!(DurationAligner::new(FixedDuration::ZERO).align(ts, origin).unwrap(), ts);
    }

    #[test]
    fn test_negative_interval_rejected() {
        let origin = at("2000-01-01T00:00:00Z");
        let result = DurationAligner::new(FixedDuration::from_hours(-1)).align(origin, origin);
        assert!(matches!(result, Err(CadenceError::InvalidInterval(_))));
    }

    #[test]
    fn test_huge_span_is_not_scanned() {
        // ~2100 years of nanosecond steps would never finish one step at a time
        let aligned = DurationAligner::new(FixedDuration::from_nanos(7))
            .with_max_correction_steps(2)
            .align(at("4123-12-03T15:53:58Z"), at("2000-01-01T00:00:00Z"))
            .unwrap();
        let offset = aligned.duration_since(at("2000-01-01T00:00:00Z")).as_nanos();
        assert_eq!(offset % 7, 0);
        assert!(aligned <= at("4123-12-03T15:53:58Z"));
    }

    #[test]
    fn test_low_correction_limits_still_align() {
        let origin = at("2000-01-01T00:00:00Z");
        for limit in [0, 1] {
            let aligner =
                DurationAligner::new(FixedDuration::from_hours(1)).with_max_correction_steps(limit);
            assert_eq!(
                aligner.align(at("2000-01-01T05:23:45Z"), origin).unwrap(),
                at("2000-01-01T05:00:00Z")
            );
            assert_eq!(
                aligner.align(at("2000-01-01T05:00:00Z"), origin).unwrap(),
                at("2000-01-01T05:00:00Z")
            );
            assert_eq!(
                aligner.align(at("1999-12-31T22:30:00Z"), origin).unwrap(),
                at("1999-12-31T22:00:00Z")
            );
        }
    }

    #[test]
    fn test_floor_at_end_of_range() {
        let hour = FixedDuration::from_hours(1);
        let last = Instant::from(chrono::DateTime::<chrono::Utc>::MAX_UTC);
        let origin = last - hour - FixedDuration::from_nanos(1);
        let aligned = DurationAligner::new(hour).align(last, origin).unwrap();
        assert_eq!(aligned, origin + hour);
        assert!(aligned.checked_add(hour).is_none());
    }
}
