//! Stopwatches for measuring elapsed time
//!
//! Built on the monotonic OS clock. Readings are only meaningful relative to
//! each other, so the watches expose durations, never absolute values.
//! Independent of the aligner: nothing in the alignment path depends on them.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::trace;

use cadence_core::{CadenceError, CadenceResult};

const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = NANOS_PER_SECOND * 60;
const NANOS_PER_HOUR: u128 = NANOS_PER_MINUTE * 60;

/// Start/stop stopwatch with a cumulative total across laps
#[derive(Clone, Debug, Default)]
pub struct NanoStopWatch {
    /// Set while running, and kept after stop for `elapsed`
    start: Option<Instant>,
    /// Length of the last completed lap
    lap: Duration,
    /// Sum of all completed laps
    cumulative: Duration,
    running: bool,
}

impl NanoStopWatch {
    /// Create a stopwatch that is already running
    pub fn started() -> Self {
        let mut watch = Self::unstarted();
        watch.start_at(Instant::now());
        watch
    }

    pub fn unstarted() -> Self {
        NanoStopWatch::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start a new lap
    pub fn start(&mut self) -> CadenceResult<()> {
        if self.running {
            return Err(CadenceError::AlreadyStarted);
        }
        self.start_at(Instant::now());
        Ok(())
    }

    /// Start running. With `reset_start` false an existing start time is
    /// kept, so a resumed lap still measures from the original start.
    pub fn restart(&mut self, reset_start: bool) {
        let start = match self.start {
            Some(start) if !reset_start => start,
            _ => Instant::now(),
        };
        self.start_at(start);
    }

    /// Stop the current lap and add it to the cumulative total
    pub fn stop(&mut self) -> CadenceResult<Duration> {
        let start = match (self.running, self.start) {
            (true, Some(start)) => start,
            _ => return Err(CadenceError::AlreadyStopped),
        };
        self.lap = start.elapsed();
        self.cumulative += self.lap;
        self.running = false;
        trace!(lap = ?self.lap, cumulative = ?self.cumulative, "stopwatch stopped");
        Ok(self.lap)
    }

    /// Stop and clear all readings
    pub fn reset(&mut self) {
        *self = NanoStopWatch::default();
    }

    /// Live reading while running, the last lap otherwise, zero if never started
    pub fn elapsed(&self) -> Duration {
        match (self.running, self.start) {
            (true, Some(start)) => start.elapsed(),
            _ => self.lap,
        }
    }

    pub fn elapsed_secs_f64(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Sum of all completed laps since the last reset
    pub fn cumulative(&self) -> Duration {
        self.cumulative
    }

    pub(crate) fn started_at(&self) -> Option<Instant> {
        self.start.filter(|_| self.running)
    }

    fn start_at(&mut self, start: Instant) {
        self.start = Some(start);
        self.lap = Duration::ZERO;
        self.running = true;
    }
}

impl fmt::Display for NanoStopWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_elapsed(self.elapsed()))
    }
}

/// Render an elapsed time with microsecond digits:
/// `S.uuuuuu` under one minute, `HH:MM:SS.uuuuuu` otherwise
pub fn format_elapsed(elapsed: Duration) -> String {
    let nanos = elapsed.as_nanos();
    let hours = nanos / NANOS_PER_HOUR;
    let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
    let seconds = (nanos % NANOS_PER_MINUTE) / NANOS_PER_SECOND;
    let micros = (nanos % NANOS_PER_SECOND) / 1_000;

    if hours == 0 && minutes == 0 {
        format!("{seconds}.{micros:06}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}

/// One measured segment of a [`SplitStopWatch`]
#[derive(Clone, Debug)]
pub struct Split {
    start: Instant,
    stop: Instant,
    description: String,
}

impl Split {
    fn ending_now(start: Instant, description: String) -> Self {
        Split {
            start,
            stop: Instant::now(),
            description,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.stop.duration_since(self.start)
    }

    pub fn elapsed_secs_f64(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Free-form context, not necessarily unique; empty for anonymous splits
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_elapsed(self.elapsed()))
    }
}

/// Stopwatch that records described splits.
///
/// Each split runs from the end of the previous split (or the watch start)
/// to the moment it is taken.
#[derive(Clone, Debug, Default)]
pub struct SplitStopWatch {
    watch: NanoStopWatch,
    splits: Vec<Split>,
}

impl SplitStopWatch {
    pub fn started() -> Self {
        SplitStopWatch {
            watch: NanoStopWatch::started(),
            splits: Vec::new(),
        }
    }

    pub fn unstarted() -> Self {
        SplitStopWatch::default()
    }

    pub fn start(&mut self) -> CadenceResult<()> {
        self.watch.start()
    }

    pub fn stop(&mut self) -> CadenceResult<Duration> {
        self.watch.stop()
    }

    pub fn is_running(&self) -> bool {
        self.watch.is_running()
    }

    pub fn watch(&self) -> &NanoStopWatch {
        &self.watch
    }

    /// Stop the watch and drop all splits
    pub fn reset(&mut self) {
        self.watch.reset();
        self.splits.clear();
    }

    /// Record an anonymous split
    pub fn split(&mut self) -> CadenceResult<&Split> {
        self.split_with("")
    }

    /// Record a split described by `description`
    pub fn split_with(&mut self, description: impl Into<String>) -> CadenceResult<&Split> {
        let watch_start = self.watch.started_at().ok_or(CadenceError::NotRunning)?;
        let start = self.splits.last().map_or(watch_start, |last| last.stop);
        Ok(self.push(Split::ending_now(start, description.into())))
    }

    /// Record a split measured from the watch start rather than the previous split
    pub fn split_from_start(&mut self, description: impl Into<String>) -> CadenceResult<&Split> {
        let watch_start = self.watch.started_at().ok_or(CadenceError::NotRunning)?;
        Ok(self.push(Split::ending_now(watch_start, description.into())))
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn splits_named<'a>(&'a self, description: &'a str) -> impl Iterator<Item = &'a Split> {
        self.splits
            .iter()
            .filter(move |split| split.description == description)
    }

    pub fn splits_matching<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = &'a Split>
    where
        P: FnMut(&str) -> bool + 'a,
    {
        self.splits
            .iter()
            .filter(move |split| predicate(&split.description))
    }

    /// Mean length in seconds of the splits named `description`, `None` if there are none
    pub fn average_secs(&self, description: &str) -> Option<f64> {
        let (count, total) = self
            .splits_named(description)
            .fold((0usize, 0.0f64), |(count, total), split| {
                (count + 1, total + split.elapsed_secs_f64())
            });
        (count > 0).then(|| total / count as f64)
    }

    fn push(&mut self, split: Split) -> &Split {
        trace!(description = %split.description, elapsed = ?split.elapsed(), "split recorded");
        self.splits.push(split);
        &self.splits[self.splits.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pause() {
        std::thread::sleep(Duration::from_millis(2));
    }

    #[test]
    fn test_unstarted_watch() {
        let mut watch = NanoStopWatch::unstarted();
        assert!(!watch.is_running());
        assert_eq!(watch.elapsed(), Duration::ZERO);
        assert_eq!(watch.cumulative(), Duration::ZERO);
        assert_eq!(watch.stop(), Err(CadenceError::AlreadyStopped));

        watch.start().unwrap();
        assert!(watch.is_running());
        pause();
        assert!(watch.elapsed() > Duration::ZERO);
        assert_eq!(watch.cumulative(), Duration::ZERO);

        let lap = watch.stop().unwrap();
        assert!(!watch.is_running());
        assert_eq!(watch.elapsed(), lap);
        assert_eq!(watch.cumulative(), lap);
    }

    #[test]
    fn test_started_watch() {
        let mut watch = NanoStopWatch::started();
        assert!(watch.is_running());
        assert_eq!(watch.start(), Err(CadenceError::AlreadyStarted));
        pause();
        assert!(watch.elapsed_secs_f64() > 0.0);
    }

    #[test]
    fn test_cumulative_over_laps() {
        let mut watch = NanoStopWatch::started();
        pause();
        let first = watch.stop().unwrap();
        watch.start().unwrap();
        pause();
        let second = watch.stop().unwrap();
        assert_eq!(watch.cumulative(), first + second);

        watch.reset();
        assert!(!watch.is_running());
        assert_eq!(watch.cumulative(), Duration::ZERO);
    }

    #[test]
    fn test_restart_keeps_start() {
        let mut watch = NanoStopWatch::started();
        pause();
        let first = watch.stop().unwrap();
        watch.restart(false);
        pause();
        let resumed = watch.stop().unwrap();
        assert!(resumed > first);

        watch.restart(true);
        assert!(watch.elapsed() < resumed);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_micros(123)), "0.000123");
        assert_eq!(format_elapsed(Duration::from_millis(1_500)), "1.500000");
        assert_eq!(
            format_elapsed(Duration::from_secs(3_723) + Duration::from_micros(456)),
            "01:02:03.000456"
        );
    }

    #[test]
    fn test_splits() {
        let mut watch = SplitStopWatch::unstarted();
        assert!(matches!(watch.split(), Err(CadenceError::NotRunning)));
        assert!(watch.splits().is_empty());

        watch.start().unwrap();
        assert!(watch.is_running());
        watch.reset();
        assert!(!watch.is_running());
        assert!(watch.splits().is_empty());

        watch.start().unwrap();
        watch.split().unwrap();
        assert_eq!(watch.splits().len(), 1);
    }

    #[test]
    fn test_split_chaining_and_queries() {
        let mut watch = SplitStopWatch::started();
        pause();
        watch.split_with("load").unwrap();
        pause();
        watch.split_with("parse").unwrap();
        pause();
        watch.split_with("load").unwrap();
        let total = watch.split_from_start("total").unwrap().elapsed();

        let chained: Duration = watch.splits()[..3].iter().map(Split::elapsed).sum();
        assert!(total >= chained);
        assert_eq!(watch.splits_named("load").count(), 2);
        assert_eq!(watch.splits_matching(|d| d.starts_with('p')).count(), 1);
        assert!(watch.average_secs("load").unwrap() > 0.0);
        assert_eq!(watch.average_secs("missing"), None);
    }

    #[test]
    fn test_split_after_stop_fails() {
        let mut watch = SplitStopWatch::started();
        watch.stop().unwrap();
        assert!(matches!(watch.split_with("late"), Err(CadenceError::NotRunning)));
    }
}
