//! `Storage` over the `object_store` crate.
//!
//! Bytes always go through `ObjectStore`, so local, in-memory and cloud
//! backends share one code path. Object stores have no directories, so a
//! local root additionally keeps real directories on disk (empty directories
//! must exist and be removable), while remote backends treat any non-empty key
//! prefix as a directory.

use crate::core::paths::object_key;
use crate::error::{FilestoreError, Result};
use crate::storage::Storage;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::TryStreamExt;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectStorePath;
use object_store::ObjectStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    /// Absolute directory the store is rooted at (local backend only).
    local_root: Option<PathBuf>,
    /// Root as configured, before symlinks were resolved.
    root_alias: Option<PathBuf>,
    /// `scheme://authority` used to build engine URLs.
    url_base: String,
}

impl ObjectStorage {
    /// Local filesystem storage rooted at `base_directory` (created if missing).
    pub fn local(base_directory: impl AsRef<Path>) -> Result<Self> {
        let path = base_directory.as_ref();
        if path.as_os_str().is_empty() {
            return Err(FilestoreError::Config(
                "Local storage requires non-empty base_directory".into(),
            ));
        }

        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| {
                FilestoreError::Config(format!(
                    "Failed to create storage directory '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }

        let absolute_path = path.canonicalize().map_err(|e| {
            FilestoreError::Config(format!(
                "Failed to resolve absolute path for '{}': {}",
                path.display(),
                e
            ))
        })?;

        let store = LocalFileSystem::new_with_prefix(&absolute_path)
            .map_err(|e| FilestoreError::Config(format!("LocalFileSystem: {e}")))?;

        let root_alias = std::path::absolute(path).ok().filter(|p| *p != absolute_path);

        Ok(Self {
            store: Arc::new(store),
            local_root: Some(absolute_path),
            root_alias,
            url_base: "file://".to_string(),
        })
    }

    /// Process-local storage; nothing touches the disk.
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            local_root: None,
            root_alias: None,
            url_base: "memory://".to_string(),
        }
    }

    /// Wrap an already configured remote store; `url_base` is e.g. `s3://bucket`.
    pub fn remote(store: Arc<dyn ObjectStore>, url_base: impl Into<String>) -> Self {
        Self {
            store,
            local_root: None,
            root_alias: None,
            url_base: url_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn local_root(&self) -> Option<&Path> {
        self.local_root.as_deref()
    }

    /// Path relative to the store root.
    ///
    /// Absolute paths must lie under the local root; without a local root the
    /// leading `/` is simply dropped.
    fn relative<'a>(&self, path: &'a Path) -> Result<&'a Path> {
        match &self.local_root {
            Some(root) if path.is_absolute() => path
                .strip_prefix(root)
                .or_else(|e| match &self.root_alias {
                    Some(alias) => path.strip_prefix(alias),
                    None => Err(e),
                })
                .map_err(|_| FilestoreError::PathTraversal(path.display().to_string())),
            _ => Ok(path),
        }
    }

    fn key(&self, path: &Path) -> Result<ObjectStorePath> {
        object_key(self.relative(path)?)
    }

    /// Real directory on disk for local storage.
    fn local_path(&self, path: &Path) -> Result<Option<PathBuf>> {
        match &self.local_root {
            Some(root) => {
                let key = self.key(path)?;
                let mut full = root.clone();
                for part in key.parts() {
                    full.push(part.as_ref());
                }
                Ok(Some(full))
            }
            None => Ok(None),
        }
    }

    async fn has_prefix(&self, key: &ObjectStorePath) -> Result<bool> {
        let listing = self
            .store
            .list_with_delimiter(Some(key))
            .await
            .map_err(|e| FilestoreError::ObjectStore(e.to_string()))?;
        Ok(!listing.objects.is_empty() || !listing.common_prefixes.is_empty())
    }
}

fn map_store_error(path: &Path, err: object_store::Error) -> FilestoreError {
    match err {
        object_store::Error::NotFound { .. } => FilestoreError::NotFound(path.display().to_string()),
        other => FilestoreError::ObjectStore(other.to_string()),
    }
}

fn map_io_error(path: &Path, err: std::io::Error) -> FilestoreError {
    match err.kind() {
        std::io::ErrorKind::NotFound => FilestoreError::NotFound(path.display().to_string()),
        std::io::ErrorKind::AlreadyExists => {
            FilestoreError::AlreadyExists(path.display().to_string())
        }
        _ => FilestoreError::Io(format!("{}: {}", path.display(), err)),
    }
}

fn matches_suffix(name: &str, suffix: Option<&str>) -> bool {
    suffix.is_none_or(|s| name.ends_with(s))
}

#[async_trait]
impl Storage for ObjectStorage {
    async fn path_exists(&self, path: &Path) -> Result<bool> {
        if let Some(full) = self.local_path(path)? {
            return Ok(tokio::fs::try_exists(&full).await.unwrap_or(false));
        }
        let key = self.key(path)?;
        match self.store.head(&key).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => self.has_prefix(&key).await,
            Err(e) => Err(map_store_error(path, e)),
        }
    }

    async fn is_dir(&self, path: &Path) -> Result<bool> {
        if let Some(full) = self.local_path(path)? {
            return Ok(tokio::fs::metadata(&full)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false));
        }
        let key = self.key(path)?;
        self.has_prefix(&key).await
    }

    async fn makedirs(&self, path: &Path, exist_ok: bool) -> Result<()> {
        if !exist_ok && self.path_exists(path).await? {
            return Err(FilestoreError::AlreadyExists(path.display().to_string()));
        }
        if let Some(full) = self.local_path(path)? {
            tokio::fs::create_dir_all(&full)
                .await
                .map_err(|e| map_io_error(path, e))?;
        }
        Ok(())
    }

    async fn listdir(&self, path: &Path, suffix: Option<&str>) -> Result<Vec<String>> {
        let mut names = Vec::new();

        if let Some(full) = self.local_path(path)? {
            let mut entries = match tokio::fs::read_dir(&full).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
                Err(e) => return Err(map_io_error(path, e)),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| map_io_error(path, e))?
            {
                let name = entry.file_name().to_string_lossy().into_owned();
                if matches_suffix(&name, suffix) {
                    names.push(name);
                }
            }
        } else {
            let key = self.key(path)?;
            let prefix = (!key.as_ref().is_empty()).then_some(&key);
            let listing = self
                .store
                .list_with_delimiter(prefix)
                .await
                .map_err(|e| map_store_error(path, e))?;
            let children = listing
                .common_prefixes
                .iter()
                .chain(listing.objects.iter().map(|meta| &meta.location))
                .filter_map(|location| location.filename().map(str::to_string));
            names.extend(children.filter(|name| matches_suffix(name, suffix)));
        }

        names.sort();
        Ok(names)
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        let key = self.key(path)?;
        match self.store.delete(&key).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(map_store_error(path, e)),
        }
    }

    async fn remove_dir(&self, path: &Path) -> Result<()> {
        if let Some(full) = self.local_path(path)? {
            return match tokio::fs::remove_dir_all(&full).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(map_io_error(path, e)),
            };
        }

        let key = self.key(path)?;
        let locations: Vec<ObjectStorePath> = self
            .store
            .list(Some(&key))
            .map_ok(|meta| meta.location)
            .try_collect()
            .await
            .map_err(|e| map_store_error(path, e))?;
        for location in locations {
            match self.store.delete(&location).await {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(map_store_error(path, e)),
            }
        }
        Ok(())
    }

    async fn read_bytes(&self, path: &Path) -> Result<Bytes> {
        let key = self.key(path)?;
        let result = self
            .store
            .get(&key)
            .await
            .map_err(|e| map_store_error(path, e))?;
        result.bytes().await.map_err(|e| map_store_error(path, e))
    }

    async fn write_bytes(&self, path: &Path, data: Bytes) -> Result<()> {
        let key = self.key(path)?;
        self.store
            .put(&key, data.into())
            .await
            .map_err(|e| map_store_error(path, e))?;
        Ok(())
    }

    fn resolve_url(&self, path: &Path) -> Result<String> {
        if let Some(full) = self.local_path(path)? {
            return Ok(format!("{}{}", self.url_base, full.display()));
        }
        let key = self.key(path)?;
        Ok(format!("{}/{}", self.url_base, key))
    }

    fn engine_store(&self) -> Option<(String, Arc<dyn ObjectStore>)> {
        match self.local_root {
            Some(_) => None,
            None => Some((self.url_base.clone(), Arc::clone(&self.store))),
        }
    }

    fn describe(&self) -> String {
        match &self.local_root {
            Some(root) => format!("local:{}", root.display()),
            None => format!("{} ({})", self.url_base, self.store),
        }
    }
}
