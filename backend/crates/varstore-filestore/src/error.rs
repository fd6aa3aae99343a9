use thiserror::Error;

/// Errors raised by storage backends and file codecs.
#[derive(Error, Debug)]
pub enum FilestoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Object store error: {0}")]
    ObjectStore(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parquet error: {0}")]
    Parquet(String),

    #[error("Serialization error at {path}: {message}")]
    Serialization { path: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid path: {0}")]
    Path(String),

    #[error("Path traversal rejected: {0}")]
    PathTraversal(String),

    #[error("{0}")]
    Other(String),
}

impl FilestoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FilestoreError::NotFound(_))
    }
}

/// Result type for filestore operations
pub type Result<T> = std::result::Result<T, FilestoreError>;
