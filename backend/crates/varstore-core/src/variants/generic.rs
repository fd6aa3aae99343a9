//! GENERIC: any JSON-representable value as `data.json` + `sample_data.json`.
//!
//! Reads fall back to the legacy `<block_dir>/<uuid>.json` record when the
//! canonical file is absent, and to `{}` when nothing exists at all.

use super::VariantContext;
use crate::error::{Result, VariableError};
use crate::options::{FailurePolicy, ReadOptions};
use serde_json::{Map, Value as JsonValue};
use varstore_commons::constants::{JSON_FILE, JSON_SAMPLE_FILE};
use varstore_filestore::{read_json_file, write_json_file};

pub async fn write(ctx: VariantContext<'_>, value: &JsonValue, policy: FailurePolicy) -> Result<()> {
    let sample = sample_json(value, ctx.settings.sample_count);
    write_records(ctx, value, &sample, policy).await
}

/// Write a full record and its precomputed sample.
pub async fn write_records(
    ctx: VariantContext<'_>,
    full: &JsonValue,
    sample: &JsonValue,
    policy: FailurePolicy,
) -> Result<()> {
    ctx.ensure_dir().await?;

    let path = ctx.file(JSON_FILE);
    let result = write_json_file(ctx.storage, &path, full).await;
    policy.absorb(
        result.map_err(VariableError::from),
        &format!("Failed to write {}", path.display()),
    )?;

    let sample_path = ctx.file(JSON_SAMPLE_FILE);
    let result = write_json_file(ctx.storage, &sample_path, sample).await;
    policy.absorb(
        result.map_err(VariableError::from),
        &format!("Failed to write {}", sample_path.display()),
    )
}

/// The stored record, without sample truncation.
pub async fn read_record(ctx: VariantContext<'_>, options: &ReadOptions) -> Result<JsonValue> {
    let default = JsonValue::Object(Map::new());

    if options.sample {
        let sample_path = ctx.file(JSON_SAMPLE_FILE);
        if ctx.storage.path_exists(&sample_path).await? {
            match read_json_file(ctx.storage, &sample_path, default.clone(), true).await {
                Ok(value) => return Ok(value),
                Err(e) => log::debug!(
                    "Sample record {} unreadable, using full record: {}",
                    sample_path.display(),
                    e
                ),
            }
        }
    }

    let full_path = ctx.file(JSON_FILE);
    let path = if ctx.storage.path_exists(&full_path).await? {
        full_path
    } else {
        ctx.paths.legacy_record().to_path_buf()
    };

    read_json_file(ctx.storage, &path, default, options.strict)
        .await
        .map_err(|e| VariableError::read_failed(&path, e))
}

pub async fn read(ctx: VariantContext<'_>, options: &ReadOptions) -> Result<JsonValue> {
    let value = read_record(ctx, options).await?;
    if options.sample {
        return Ok(sample_json(&value, ctx.sample_count(options)));
    }
    Ok(value)
}

/// Bound every list in `value` to `max_items` entries, recursively.
pub fn sample_json(value: &JsonValue, max_items: usize) -> JsonValue {
    match value {
        JsonValue::Array(items) => JsonValue::Array(
            items
                .iter()
                .take(max_items)
                .map(|item| sample_json(item, max_items))
                .collect(),
        ),
        JsonValue::Object(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), sample_json(v, max_items)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TestVariable;
    use serde_json::json;

    #[test]
    fn test_sample_json_is_recursive() {
        let value = json!({"rows": [[1, 2, 3], [4, 5, 6], [7, 8, 9]], "name": "x"});
        assert_eq!(
            sample_json(&value, 2),
            json!({"rows": [[1, 2], [4, 5]], "name": "x"})
        );
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let var = TestVariable::in_memory();
        let value = json!({"items": (0..10).collect::<Vec<_>>()});
        write(var.ctx(), &value, FailurePolicy::Propagate).await.unwrap();

        assert_eq!(read(var.ctx(), &ReadOptions::default()).await.unwrap(), value);
        let sampled = read(var.ctx(), &ReadOptions::default().with_sample_count(3))
            .await
            .unwrap();
        assert_eq!(sampled, json!({"items": [0, 1, 2]}));
    }

    #[tokio::test]
    async fn test_missing_record_defaults_to_empty_object() {
        let var = TestVariable::in_memory();
        let value = read(var.ctx(), &ReadOptions::default().strict()).await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_corrupt_record() {
        let var = TestVariable::in_memory();
        var.put(JSON_FILE, b"{not json").await;

        assert_eq!(read(var.ctx(), &ReadOptions::default()).await.unwrap(), json!({}));
        let err = read(var.ctx(), &ReadOptions::default().strict()).await.unwrap_err();
        assert!(matches!(err, VariableError::CorruptRecord { .. }));
    }

    #[tokio::test]
    async fn test_legacy_record() {
        let var = TestVariable::in_memory();
        var.put_at(var.paths.legacy_record(), b"[1, 2]").await;
        assert_eq!(read(var.ctx(), &ReadOptions::default()).await.unwrap(), json!([1, 2]));
    }
}
