//! Error types for signal operations.

use sf_core::SfError;
use thiserror::Error;

/// Result type for signal operations.
pub type SignalResult<T> = Result<T, SignalError>;

/// Errors that can occur while constructing or aligning signals.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    /// Axis or sample values that violate the signal invariants.
    #[error("Invalid signal: {0}")]
    Invalid(#[from] SfError),

    /// Sample buffer does not fit the declared shape.
    #[error("Sample buffer of length {len} does not fit {channels} channel(s)")]
    Shape { len: usize, channels: usize },

    /// Stated axis end disagrees with the number of samples.
    #[error("Axis declares {declared} samples, buffer holds {found}")]
    AxisMismatch { declared: usize, found: usize },

    /// Signals that must share one sampling interval do not.
    #[error("Sampling interval mismatch for signal {index}: expected {expected}, found {found}")]
    SamplingMismatch {
        index: usize,
        expected: f64,
        found: f64,
    },

    /// Alignment was requested for an empty set of signals.
    #[error("No signals to align")]
    NoSignals,
}
