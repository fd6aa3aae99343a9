// Error types module
use arrow::error::ArrowError;
use datafusion::error::DataFusionError;
use thiserror::Error;
use varstore_commons::CommonError;
use varstore_filestore::FilestoreError;

/// Errors surfaced by the variable engine.
///
/// Most failures inside a read or write are absorbed (logged, then a default or
/// best-effort value is used). What reaches the caller is either a failure that
/// leaves no usable value, or anything at all when a read runs in strict mode.
#[derive(Error, Debug)]
pub enum VariableError {
    #[error("Storage error: {0}")]
    Storage(#[from] FilestoreError),

    #[error("Value error: {0}")]
    Common(#[from] CommonError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt metadata record at {path}: {message}")]
    CorruptMetadata { path: String, message: String },

    #[error("Corrupt record file at {path}: {message}")]
    CorruptRecord { path: String, message: String },

    #[error("Cannot cast column '{column}' to {target}: {message}")]
    ColumnCast {
        column: String,
        target: String,
        message: String,
    },

    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Reading a distributed variable requires an engine context")]
    MissingEngine,

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Invalid variable identity: {0}")]
    InvalidIdentity(String),

    #[error("A {variant} variable cannot store a {value} value")]
    Unsupported { variant: String, value: String },

    #[error("Codec error: {0}")]
    Codec(String),
}

impl VariableError {
    /// Wrap a failed read of `path`, keeping not-found distinguishable.
    pub fn read_failed(path: &std::path::Path, err: FilestoreError) -> Self {
        match err {
            FilestoreError::NotFound(p) => VariableError::NotFound(p),
            FilestoreError::Serialization { path, message } => {
                VariableError::CorruptRecord { path, message }
            }
            other => VariableError::ReadFailed {
                path: path.display().to_string(),
                message: other.to_string(),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            VariableError::NotFound(_) => true,
            VariableError::Storage(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl From<DataFusionError> for VariableError {
    fn from(err: DataFusionError) -> Self {
        VariableError::Engine(err.to_string())
    }
}

/// Result type for variable operations
pub type Result<T> = std::result::Result<T, VariableError>;
