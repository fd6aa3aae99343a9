use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised while building or converting in-memory values.
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Please do not use duplicate column name: \"{0}\"")]
    DuplicateColumn(String),

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Value cannot be represented as an Arrow array: {0}")]
    Unrepresentable(String),

    #[error("Invalid sparse matrix: {0}")]
    InvalidMatrix(String),

    #[error("Unsupported value: {0}")]
    Unsupported(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cannot cast {value} to {target}")]
    Cast { value: String, target: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

/// Result type for value-model operations
pub type Result<T> = std::result::Result<T, CommonError>;
