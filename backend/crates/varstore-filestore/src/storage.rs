//! Storage backend contract.
//!
//! Every operation is async; the blocking forms live on `dyn Storage` and
//! drive the async ones through [`run_blocking`], so both paths hit the backend
//! in exactly the same way.

use crate::core::runtime::run_blocking;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::ObjectStore;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

#[async_trait]
pub trait Storage: Send + Sync + Debug {
    /// True for files and directories.
    async fn path_exists(&self, path: &Path) -> Result<bool>;

    async fn is_dir(&self, path: &Path) -> Result<bool>;

    /// Create `path` and its parents. Fails on an existing path unless `exist_ok`.
    async fn makedirs(&self, path: &Path, exist_ok: bool) -> Result<()>;

    /// Names of the immediate children of `path`, optionally filtered by suffix.
    /// A missing directory lists as empty.
    async fn listdir(&self, path: &Path, suffix: Option<&str>) -> Result<Vec<String>>;

    /// Delete a file. Missing files are not an error.
    async fn remove(&self, path: &Path) -> Result<()>;

    /// Delete a directory and everything under it. Missing directories are not an error.
    async fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Fails with `FilestoreError::NotFound` when the file is absent.
    async fn read_bytes(&self, path: &Path) -> Result<Bytes>;

    /// Replace the file contents, creating parents as needed.
    async fn write_bytes(&self, path: &Path, data: Bytes) -> Result<()>;

    /// URL of `path` as understood by the query engine.
    fn resolve_url(&self, path: &Path) -> Result<String>;

    /// Store the query engine must register to reach URLs from [`Storage::resolve_url`].
    ///
    /// `None` when the engine's built-in local filesystem store already covers them.
    fn engine_store(&self) -> Option<(String, Arc<dyn ObjectStore>)>;

    fn describe(&self) -> String;
}

impl dyn Storage {
    pub fn path_exists_sync(&self, path: &Path) -> Result<bool> {
        run_blocking(|| self.path_exists(path))
    }

    pub fn is_dir_sync(&self, path: &Path) -> Result<bool> {
        run_blocking(|| self.is_dir(path))
    }

    pub fn makedirs_sync(&self, path: &Path, exist_ok: bool) -> Result<()> {
        run_blocking(|| self.makedirs(path, exist_ok))
    }

    pub fn listdir_sync(&self, path: &Path, suffix: Option<&str>) -> Result<Vec<String>> {
        run_blocking(|| self.listdir(path, suffix))
    }

    pub fn remove_sync(&self, path: &Path) -> Result<()> {
        run_blocking(|| self.remove(path))
    }

    pub fn remove_dir_sync(&self, path: &Path) -> Result<()> {
        run_blocking(|| self.remove_dir(path))
    }

    pub fn read_bytes_sync(&self, path: &Path) -> Result<Bytes> {
        run_blocking(|| self.read_bytes(path))
    }

    pub fn write_bytes_sync(&self, path: &Path, data: Bytes) -> Result<()> {
        run_blocking(|| self.write_bytes(path, data))
    }
}
