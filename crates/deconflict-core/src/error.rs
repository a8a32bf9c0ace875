//! Error taxonomy for the deconfliction core.

use thiserror::Error;

/// Errors raised by trajectory construction and conflict detection.
///
/// Every error is returned synchronously to the immediate caller. Nothing in
/// the core retries or returns a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeconflictError {
    /// Malformed waypoint or mission window input to the trajectory builder.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Structurally inconsistent trajectory handed to the detector.
    #[error("invalid trajectory: {0}")]
    InvalidTrajectory(String),

    /// Threshold configuration out of range.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, DeconflictError>;
