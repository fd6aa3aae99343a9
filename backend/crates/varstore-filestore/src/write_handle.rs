//! Scoped write handles.
//!
//! The caller writes into an in-memory buffer; the bytes reach storage only
//! when the closure returns `Ok`. On error (or panic) the buffer is dropped and
//! the target path is left untouched.

use crate::core::runtime::run_blocking;
use crate::error::Result;
use crate::storage::Storage;
use bytes::Bytes;
use std::io::Write;
use std::path::Path;

/// Run `write` against a buffered handle for `path`, then persist it.
///
/// Returns the number of bytes written.
pub async fn open_to_write<F>(storage: &dyn Storage, path: &Path, write: F) -> Result<u64>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let mut buffer: Vec<u8> = Vec::new();
    write(&mut buffer)?;
    let size = buffer.len() as u64;
    storage.write_bytes(path, Bytes::from(buffer)).await?;
    Ok(size)
}

/// Synchronous wrapper for open_to_write.
pub fn open_to_write_sync<F>(storage: &dyn Storage, path: &Path, write: F) -> Result<u64>
where
    F: FnOnce(&mut dyn Write) -> Result<()> + Send,
{
    run_blocking(|| open_to_write(storage, path, write))
}
