//! Cadence Time - Interval alignment and elapsed-time measurement
//!
//! This crate implements the alignment engine:
//! - Dispatch on interval kind (calendar, fixed duration, zero)
//! - Zone-independent floor for fixed-length intervals
//! - Zoned calendar stepping for intervals with a period
//! - Stopwatches with laps and described splits

pub mod aligner;
pub mod calendar;
pub mod duration;
pub mod stopwatch;

pub use aligner::*;
pub use calendar::*;
pub use duration::*;
pub use stopwatch::*;
