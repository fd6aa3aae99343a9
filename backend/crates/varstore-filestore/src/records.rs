//! JSON record files.

use crate::core::runtime::run_blocking;
use crate::error::{FilestoreError, Result};
use crate::storage::Storage;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Read and decode a JSON record.
///
/// A missing file yields `default`. A file that cannot be read or decoded
/// yields `default` with a warning, or the error when `raise` is set.
pub async fn read_json_file<T: DeserializeOwned>(
    storage: &dyn Storage,
    path: &Path,
    default: T,
    raise: bool,
) -> Result<T> {
    let bytes = match storage.read_bytes(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.is_not_found() => return Ok(default),
        Err(e) if raise => return Err(e),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read record file");
            return Ok(default);
        }
    };

    match serde_json::from_slice::<T>(&bytes) {
        Ok(value) => Ok(value),
        Err(e) if raise => Err(FilestoreError::Serialization {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Malformed record file");
            Ok(default)
        }
    }
}

/// Encode `value` as JSON and replace the file at `path`.
pub async fn write_json_file<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    path: &Path,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec(value).map_err(|e| FilestoreError::Serialization {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    storage.write_bytes(path, Bytes::from(bytes)).await
}

/// Synchronous wrapper for read_json_file.
pub fn read_json_file_sync<T: DeserializeOwned + Send>(
    storage: &dyn Storage,
    path: &Path,
    default: T,
    raise: bool,
) -> Result<T> {
    run_blocking(|| read_json_file(storage, path, default, raise))
}

/// Synchronous wrapper for write_json_file.
pub fn write_json_file_sync<T: Serialize + Sync + ?Sized>(
    storage: &dyn Storage,
    path: &Path,
    value: &T,
) -> Result<()> {
    run_blocking(|| write_json_file(storage, path, value))
}
