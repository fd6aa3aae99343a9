//! Canonical on-disk layout of a variable.
//!
//! ```text
//! <pipeline_path>/<variables_dir>/[<partition>/]<block_dir>/<uuid>/type.json
//!                                                          /<uuid>/data.parquet ...
//!                                                          /<uuid>.json   (legacy)
//! ```
//!
//! Every path is a pure function of the identity and the variable settings.

use std::path::{Path, PathBuf};
use varstore_commons::constants::{LEGACY_JSON_SUFFIX, METADATA_FILE};
use varstore_commons::{clean_name, VariableIdentity};
use varstore_configs::VariableSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePaths {
    variable_dir: PathBuf,
    variable_path: PathBuf,
    legacy_record: PathBuf,
}

impl VariablePaths {
    pub fn new(identity: &VariableIdentity, settings: &VariableSettings) -> Self {
        let block_dir_name = if settings.clean_block_uuid {
            clean_name(identity.block_uuid.as_str())
        } else {
            identity.block_uuid.as_str().to_string()
        };

        let mut variable_dir = identity.pipeline_path.join(&settings.variables_dir);
        if let Some(partition) = identity.partition.as_deref().filter(|p| !p.is_empty()) {
            variable_dir.push(partition);
        }
        variable_dir.push(block_dir_name);

        let uuid = identity.uuid.as_str();
        Self {
            variable_path: variable_dir.join(uuid),
            legacy_record: variable_dir.join(format!("{}{}", uuid, LEGACY_JSON_SUFFIX)),
            variable_dir,
        }
    }

    /// Block directory shared by all variables of a block.
    pub fn variable_dir(&self) -> &Path {
        &self.variable_dir
    }

    /// Directory owned by this variable.
    pub fn variable_path(&self) -> &Path {
        &self.variable_path
    }

    pub fn metadata(&self) -> PathBuf {
        self.file(METADATA_FILE)
    }

    /// Pre-migration single-file record `<block_dir>/<uuid>.json`.
    pub fn legacy_record(&self) -> &Path {
        &self.legacy_record
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.variable_path.join(name)
    }

    /// Block directory for `block_uuid` with sanitised naming.
    pub fn block_dir(pipeline_path: &Path, variables_dir: &str, block_uuid: &str) -> PathBuf {
        pipeline_path.join(variables_dir).join(clean_name(block_uuid))
    }
}
