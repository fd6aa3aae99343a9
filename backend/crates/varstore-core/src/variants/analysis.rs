//! FRAME_ANALYSIS: one JSON document per analysis key, no metadata record.

use super::VariantContext;
use crate::error::{Result, VariableError};
use crate::options::ReadOptions;
use serde_json::{Map, Value as JsonValue};
use std::path::PathBuf;
use varstore_commons::constants::ANALYSIS_KEYS;
use varstore_filestore::{read_json_file, write_json_file};

fn document(ctx: &VariantContext<'_>, key: &str) -> PathBuf {
    ctx.file(&format!("{}.json", key))
}

/// Write every analysis document; keys missing from `value` are stored as `null`.
pub async fn write(ctx: VariantContext<'_>, value: &JsonValue) -> Result<()> {
    ctx.storage.makedirs(ctx.paths.variable_path(), true).await?;
    for key in ANALYSIS_KEYS {
        let document_value = value.get(key).unwrap_or(&JsonValue::Null);
        write_json_file(ctx.storage, &document(&ctx, key), document_value).await?;
    }
    Ok(())
}

/// Documents for the requested keys (all of them by default), `{}` each when missing.
pub async fn read(ctx: VariantContext<'_>, options: &ReadOptions) -> Result<JsonValue> {
    let mut result = Map::new();
    if !ctx.storage.path_exists(ctx.paths.variable_path()).await? {
        return Ok(JsonValue::Object(result));
    }

    for key in ANALYSIS_KEYS {
        let wanted = options
            .analysis_keys
            .as_ref()
            .is_none_or(|keys| keys.iter().any(|k| k == key));
        if !wanted {
            continue;
        }
        let path = document(&ctx, key);
        let value = read_json_file(ctx.storage, &path, JsonValue::Object(Map::new()), options.strict)
            .await
            .map_err(|e| VariableError::read_failed(&path, e))?;
        result.insert(key.to_string(), value);
    }
    Ok(JsonValue::Object(result))
}

/// Remove the analysis documents only; other files in the directory stay.
pub async fn delete(ctx: VariantContext<'_>) -> Result<()> {
    for key in ANALYSIS_KEYS {
        let path = document(&ctx, key);
        if let Err(e) = ctx.storage.remove(&path).await {
            log::warn!("Failed to delete {}: {}", path.display(), e);
        }
    }
    Ok(())
}
