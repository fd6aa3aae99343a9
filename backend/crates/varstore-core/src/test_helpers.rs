//! Fixtures shared by the unit tests.

use crate::paths::VariablePaths;
use crate::variants::VariantContext;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::path::Path;
use varstore_commons::VariableIdentity;
use varstore_configs::VariableSettings;
use varstore_filestore::{ObjectStorage, Storage};

/// A variable location on a throwaway storage.
pub(crate) struct TestVariable {
    pub storage: ObjectStorage,
    pub paths: VariablePaths,
    pub settings: VariableSettings,
    _dir: Option<tempfile::TempDir>,
}

impl TestVariable {
    pub fn in_memory() -> Self {
        Self::in_memory_with(|_| {})
    }

    pub fn in_memory_with(configure: impl FnOnce(&mut VariableSettings)) -> Self {
        let mut settings = VariableSettings::default();
        configure(&mut settings);
        let identity = VariableIdentity::new("/pipelines/test", "load_data", "output_0");
        Self {
            storage: ObjectStorage::in_memory(),
            paths: VariablePaths::new(&identity, &settings),
            settings,
            _dir: None,
        }
    }

    pub fn local() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let settings = VariableSettings::default();
        let identity =
            VariableIdentity::new(dir.path().join("pipelines/test"), "load_data", "output_0");
        Self {
            storage: ObjectStorage::local(dir.path()).unwrap(),
            paths: VariablePaths::new(&identity, &settings),
            settings,
            _dir: Some(dir),
        }
    }

    pub fn ctx(&self) -> VariantContext<'_> {
        VariantContext::new(&self.storage, &self.paths, &self.settings)
    }

    pub async fn put(&self, name: &str, contents: &[u8]) {
        self.put_at(&self.paths.file(name), contents).await;
    }

    pub async fn put_at(&self, path: &Path, contents: &[u8]) {
        self.storage
            .write_bytes(path, Bytes::copy_from_slice(contents))
            .await
            .unwrap();
    }

    pub async fn exists(&self, name: &str) -> bool {
        self.storage.path_exists(&self.paths.file(name)).await.unwrap()
    }

    pub async fn json<T: DeserializeOwned>(&self, name: &str) -> T {
        let bytes = self.storage.read_bytes(&self.paths.file(name)).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
