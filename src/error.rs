//! Error types for unicell operations.

use thiserror::Error;

/// Result type alias using the unicell [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during unicell operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Construction-time violations: non-positive resolution or size,
    /// out-of-range densities, invalid material constants, non-PD tensors,
    /// mismatched shapes.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Node or element index beyond the grid.
    #[error("index out of range: {0}")]
    OutOfRange(String),

    /// Degenerate (det J = 0) or inverted (det J < 0) element geometry.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Iterative solver non-convergence or internal numerical issue.
    #[error("solver error: {0}")]
    Solver(String),

    /// Malformed CSV content.
    #[error("parse error: {0}")]
    Parse(String),

    /// File open/read/write failures.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
