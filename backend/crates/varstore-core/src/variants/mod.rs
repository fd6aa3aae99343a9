//! Variant Serializers.
//!
//! One module per variant. Each exposes free async functions over a
//! [`VariantContext`]; the facade picks the module from the resolved tag.
//! Nothing here blocks: the blocking facade drives the same futures.

pub mod alt_engine;
pub mod analysis;
pub mod distributed;
pub mod generic;
pub mod geospatial;
pub mod model;
pub mod series;
pub mod sparse;
pub mod tabular;

use crate::error::{Result, VariableError};
use crate::options::ReadOptions;
use crate::paths::VariablePaths;
use std::path::PathBuf;
use varstore_commons::{VariableType, VariableValue};
use varstore_configs::VariableSettings;
use varstore_filestore::Storage;

/// Everything a serializer needs to reach one variable's files.
#[derive(Debug, Clone, Copy)]
pub struct VariantContext<'a> {
    pub storage: &'a dyn Storage,
    pub paths: &'a VariablePaths,
    pub settings: &'a VariableSettings,
}

impl<'a> VariantContext<'a> {
    pub fn new(
        storage: &'a dyn Storage,
        paths: &'a VariablePaths,
        settings: &'a VariableSettings,
    ) -> Self {
        Self {
            storage,
            paths,
            settings,
        }
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.paths.file(name)
    }

    /// Create the variable directory unless it already is one.
    pub async fn ensure_dir(&self) -> Result<()> {
        let path = self.paths.variable_path();
        if !self.storage.is_dir(path).await? {
            self.storage.makedirs(path, true).await?;
        }
        Ok(())
    }

    /// Row bound for a sampled read.
    pub fn sample_count(&self, options: &ReadOptions) -> usize {
        options.sample_count.unwrap_or(self.settings.sample_count)
    }
}

pub(crate) fn unsupported(variant: VariableType, value: &VariableValue) -> VariableError {
    VariableError::Unsupported {
        variant: variant.to_string(),
        value: value.kind().to_string(),
    }
}
