//! Cadence Core - Time value types and primitives
//!
//! This crate defines the value types shared by the alignment engine:
//! - Absolute instants (`Instant`) parsed from RFC 3339
//! - Fixed-length durations and calendar periods, parsed from ISO 8601
//! - Composite intervals (period + duration)
//! - Time zones and the error taxonomy

mod iso;

pub mod duration;
pub mod error;
pub mod instant;
pub mod interval;
pub mod period;
pub mod zone;

pub use duration::*;
pub use error::*;
pub use instant::*;
pub use interval::*;
pub use period::*;
pub use zone::*;
