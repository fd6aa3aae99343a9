//! MODEL_ARTIFACT: the origin as a JSON record plus the artifact as `model.bin`.

use super::{generic, VariantContext};
use crate::error::{Result, VariableError};
use crate::options::FailurePolicy;
use bytes::Bytes;
use varstore_commons::constants::MODEL_FILE;
use varstore_commons::ModelArtifact;

pub async fn write(
    ctx: VariantContext<'_>,
    artifact: &ModelArtifact,
    policy: FailurePolicy,
) -> Result<()> {
    let origin = serde_json::to_value(artifact.origin())
        .map_err(|e| VariableError::Codec(e.to_string()))?;
    generic::write_records(ctx, &origin, &origin, policy).await?;

    let bytes = artifact.to_bytes()?;
    ctx.storage
        .write_bytes(&ctx.file(MODEL_FILE), Bytes::from(bytes))
        .await?;
    Ok(())
}

/// A missing artifact file is an error: there is no meaningful default model.
pub async fn read(ctx: VariantContext<'_>) -> Result<ModelArtifact> {
    let path = ctx.file(MODEL_FILE);
    let bytes = ctx
        .storage
        .read_bytes(&path)
        .await
        .map_err(|e| VariableError::read_failed(&path, e))?;
    Ok(ModelArtifact::from_bytes(&bytes)?)
}
