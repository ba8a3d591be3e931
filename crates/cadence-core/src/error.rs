//! Error types for Cadence

use thiserror::Error;

/// Core Cadence errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CadenceError {
    // Argument errors
    #[error("Time zone must be specified when the interval has a calendar period")]
    MissingZone,

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    // Parse errors
    #[error("Cannot parse {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error("Unknown time zone: {0}")]
    UnknownZone(String),

    // Arithmetic errors
    #[error("Time arithmetic out of range")]
    OutOfRange,

    #[error("Step limit exceeded: more than {limit} steps")]
    StepLimitExceeded { limit: u64 },

    // Stopwatch errors
    #[error("Stopwatch already started")]
    AlreadyStarted,

    #[error("Stopwatch already stopped")]
    AlreadyStopped,

    #[error("Stopwatch has not been started")]
    NotRunning,
}

impl CadenceError {
    pub fn parse(input: &str, reason: impl Into<String>) -> Self {
        CadenceError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for Cadence operations
pub type CadenceResult<T> = Result<T, CadenceError>;
