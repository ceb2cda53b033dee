//! Errors of the core components.
use thiserror::Error;

/// Error type shared by the core components.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The replay buffer holds fewer live transitions than requested.
    ///
    /// The learning update rule recovers from this locally by skipping the
    /// optimization step; it is never surfaced through the tick interface.
    #[error("insufficient data in the replay buffer: {len} stored, {requested} requested")]
    InsufficientData {
        /// Number of live transitions currently stored.
        len: usize,
        /// Number of transitions requested.
        requested: usize,
    },

    /// An observation or action vector has an unexpected length.
    ///
    /// This is an integration error at the boundary between the simulation
    /// and the estimator and is treated as fatal.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Declared dimension.
        expected: usize,
        /// Dimension actually observed.
        found: usize,
    },

    /// A record does not contain the requested key.
    #[error("key {0} was not found in the record")]
    RecordKeyNotFound(String),

    /// A record value has a type different from the requested one.
    #[error("record value for key {0} has an unexpected type")]
    RecordValueType(String),
}
