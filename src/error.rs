//! Error types for the relationship explorer
//!
//! Every failure carries enough context to act on: which value was rejected,
//! which cell failed, which dependency was missing.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Relationship explorer error types
#[derive(Error, Debug)]
pub enum Error {
    /// Parameter value outside its configured range (or not a number)
    #[error("Invalid parameter '{name}': {value} is outside [{min}, {max}]\nNo cells were recomputed")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Rejected value
        value: f64,
        /// Lower bound (inclusive)
        min: f64,
        /// Upper bound (inclusive)
        max: f64,
    },

    /// Invalid input to an operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Paired sequences of different length
    #[error("Length mismatch: x has {x_len} values, y has {y_len}")]
    LengthMismatch {
        /// Length of the explanatory sequence
        x_len: usize,
        /// Length of the response sequence
        y_len: usize,
    },

    /// Sample cannot produce a statistic (too short, zero variance, non-finite)
    #[error("Degenerate sample: {0}")]
    DegenerateSample(String),

    /// Two graph nodes declared with the same name
    #[error("Duplicate cell name: '{0}'")]
    DuplicateCell(String),

    /// Reference to a cell or parameter that was never declared
    #[error("Unknown cell: '{0}'")]
    UnknownCell(String),

    /// Dependency declarations contain a cycle
    #[error("Dependency cycle detected among cells: {}", .0.join(", "))]
    CycleDetected(Vec<String>),

    /// A cell computation failed during a recomputation pass
    #[error("Cell '{cell}' failed: {source}\nCommitted state left unchanged")]
    CellFailed {
        /// Name of the failing cell
        cell: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Chart or report rendering failed
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration rejected
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
