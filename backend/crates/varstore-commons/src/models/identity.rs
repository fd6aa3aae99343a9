//! Identity of a single persisted variable.

use super::ids::{BlockUuid, VariableUuid};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `(pipeline_path, partition, block_uuid, uuid)`
///
/// The storage location of a variable is a pure function of this tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableIdentity {
    pub pipeline_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    pub block_uuid: BlockUuid,
    pub uuid: VariableUuid,
}

impl VariableIdentity {
    pub fn new(
        pipeline_path: impl Into<PathBuf>,
        block_uuid: impl Into<BlockUuid>,
        uuid: impl Into<VariableUuid>,
    ) -> Self {
        Self {
            pipeline_path: pipeline_path.into(),
            partition: None,
            block_uuid: block_uuid.into(),
            uuid: uuid.into(),
        }
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }
}

impl std::fmt::Display for VariableIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.partition {
            Some(partition) => write!(
                f,
                "{}:{}/{}:{}",
                self.pipeline_path.display(),
                partition,
                self.block_uuid,
                self.uuid
            ),
            None => write!(f, "{}:{}:{}", self.pipeline_path.display(), self.block_uuid, self.uuid),
        }
    }
}
