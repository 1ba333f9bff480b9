use thiserror::Error;

/// Failures that abort processing of a whole recording.
///
/// A wave that cannot be located inside a beat is never an error; it only
/// leaves the wave's fields empty and the beat invalid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DelineationError {
    #[error("unknown baseline filter `{0}` (expected LOWPASS, MEAN or MEDIAN)")]
    UnknownBaselineFilter(String),
    #[error("sampling frequency must be positive, got {0}")]
    InvalidFrequency(f64),
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
    #[error("direct-timing sample {index} has a time ({time}) earlier than its predecessor")]
    NonMonotonicTime { index: usize, time: f64 },
}
