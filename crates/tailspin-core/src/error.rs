//! Error types for Tailspin analysis

use thiserror::Error;

use crate::RadioFamily;

/// Core Tailspin errors
///
/// Every variant names the precondition that failed. Degenerate but valid
/// inputs (empty timelines, zero-length traces) never produce an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TailspinError {
    // Input contract errors
    #[error("Timeline not sorted: packet {index} at {current}s precedes previous packet at {previous}s")]
    UnsortedTimeline {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("Invalid timestamp on packet {index}: {value}")]
    InvalidTimestamp { index: usize, value: f64 },

    #[error("Trace duration {duration}s ends before last packet at {last_packet}s")]
    TraceTooShort { last_packet: f64, duration: f64 },

    #[error("Invalid trace duration: {0}")]
    InvalidDuration(f64),

    #[error("Malformed trace document: {0}")]
    TraceFormat(String),

    // Configuration errors
    #[error("Invalid profile value for {field}: {reason}")]
    InvalidProfile { field: &'static str, reason: String },

    #[error("Profile is for {profile} but trace was captured on {trace}")]
    FamilyMismatch {
        profile: RadioFamily,
        trace: RadioFamily,
    },

    #[error("Malformed profile document: {0}")]
    ProfileFormat(String),
}

impl TailspinError {
    /// Is this a configuration error (profile problem) rather than an input problem?
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TailspinError::InvalidProfile { .. }
                | TailspinError::FamilyMismatch { .. }
                | TailspinError::ProfileFormat(_)
        )
    }
}

/// Result type for Tailspin operations
pub type TailspinResult<T> = Result<T, TailspinError>;
