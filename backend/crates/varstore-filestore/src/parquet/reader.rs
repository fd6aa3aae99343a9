//! Parquet reads.

use crate::core::runtime::run_blocking;
use crate::error::{FilestoreError, Result};
use crate::storage::Storage;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::collections::HashMap;
use std::path::Path;

/// Footer entry holding the serialized Arrow schema; never user metadata.
const ARROW_SCHEMA_KEY: &str = "ARROW:schema";

/// A whole Parquet file: all rows in one batch plus the footer key-value metadata.
#[derive(Debug, Clone)]
pub struct ParquetTable {
    pub batch: RecordBatch,
    pub key_value_metadata: HashMap<String, String>,
}

/// Parse Parquet bytes into a single RecordBatch.
///
/// This reads the entire file into memory, so use carefully for large files.
pub fn parse_parquet_from_bytes(bytes: Bytes) -> Result<ParquetTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .map_err(|e| FilestoreError::Parquet(e.to_string()))?;

    let key_value_metadata: HashMap<String, String> = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .map(|entries| {
            entries
                .iter()
                .filter(|kv| kv.key != ARROW_SCHEMA_KEY)
                .filter_map(|kv| kv.value.clone().map(|v| (kv.key.clone(), v)))
                .collect()
        })
        .unwrap_or_default();

    let schema = builder.schema().clone();
    let row_group_count = builder.metadata().num_row_groups();
    let reader = builder.build().map_err(|e| FilestoreError::Parquet(e.to_string()))?;

    let mut batches = Vec::with_capacity(row_group_count);
    for batch_result in reader {
        let batch = batch_result.map_err(|e| FilestoreError::Parquet(e.to_string()))?;
        batches.push(batch);
    }

    let batch = concat_batches(&schema, &batches)
        .map_err(|e| FilestoreError::Parquet(e.to_string()))?;

    Ok(ParquetTable {
        batch,
        key_value_metadata,
    })
}

/// Read a Parquet file from storage.
pub async fn read_parquet(storage: &dyn Storage, path: &Path) -> Result<ParquetTable> {
    let bytes = storage.read_bytes(path).await?;
    parse_parquet_from_bytes(bytes)
}

/// Synchronous wrapper for read_parquet.
pub fn read_parquet_sync(storage: &dyn Storage, path: &Path) -> Result<ParquetTable> {
    run_blocking(|| read_parquet(storage, path))
}
