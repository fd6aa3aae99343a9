//! DISTRIBUTED_DATAFRAME: a directory of Parquet part files owned by the engine.
//!
//! No metadata record is written; the classifier recognises the directory by
//! its part files. The directory is replaced wholesale on every write.

use super::{unsupported, VariantContext};
use crate::engine::DistributedContext;
use crate::error::{Result, VariableError};
use crate::options::ReadOptions;
use datafusion::dataframe::{DataFrame, DataFrameWriteOptions};
use datafusion::execution::object_store::ObjectStoreUrl;
use datafusion::prelude::ParquetReadOptions;
use varstore_commons::{VariableType, VariableValue};
use varstore_filestore::Storage;

pub async fn write(
    ctx: VariantContext<'_>,
    value: &VariableValue,
    engine: Option<&DistributedContext>,
) -> Result<()> {
    let df = match value {
        VariableValue::Distributed(df) => df.clone(),
        VariableValue::Batch(batch) => engine_for(engine)?.session().read_batch(batch.clone())?,
        VariableValue::Frame(frame) => engine_for(engine)?
            .session()
            .read_batch(frame.to_record_batch()?)?,
        other => return Err(unsupported(VariableType::Distributed, other)),
    };

    let path = ctx.paths.variable_path();
    ctx.storage.remove_dir(path).await?;
    ctx.storage.makedirs(path, true).await?;

    register_on_dataframe(&df, ctx.storage)?;
    let url = directory_url(ctx.storage, path)?;
    log::debug!("Writing distributed dataframe to {}", url);
    df.write_parquet(&url, DataFrameWriteOptions::new(), None)
        .await?;
    Ok(())
}

pub async fn read(
    ctx: VariantContext<'_>,
    options: &ReadOptions,
    engine: Option<&DistributedContext>,
) -> Result<DataFrame> {
    let engine = engine_for(engine)?;
    engine.register_storage(ctx.storage)?;

    let url = directory_url(ctx.storage, ctx.paths.variable_path())?;
    let df = engine
        .session()
        .read_parquet(url, ParquetReadOptions::default())
        .await?;
    if options.sample {
        return Ok(df.limit(0, Some(ctx.sample_count(options)))?);
    }
    Ok(df)
}

fn engine_for(engine: Option<&DistributedContext>) -> Result<&DistributedContext> {
    engine.ok_or(VariableError::MissingEngine)
}

/// The dataframe may come from any session; its runtime must see our store.
fn register_on_dataframe(df: &DataFrame, storage: &dyn Storage) -> Result<()> {
    if let Some((url, store)) = storage.engine_store() {
        let url = ObjectStoreUrl::parse(&url)?;
        df.task_ctx()
            .runtime_env()
            .register_object_store(url.as_ref(), store);
    }
    Ok(())
}

fn directory_url(storage: &dyn Storage, path: &std::path::Path) -> Result<String> {
    let mut url = storage.resolve_url(path)?;
    if !url.ends_with('/') {
        url.push('/');
    }
    Ok(url)
}
