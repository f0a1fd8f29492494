//! Error types for the anofox-periodicity library.

use thiserror::Error;

/// Result type alias for periodicity operations.
pub type Result<T> = std::result::Result<T, PeriodicityError>;

/// Errors that can occur while preparing a series or detecting periods.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeriodicityError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A NaN or infinite value was found in the input.
    #[error("non-finite value at index {index}")]
    NonFiniteValue { index: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input the numerical collaborators cannot process.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}
