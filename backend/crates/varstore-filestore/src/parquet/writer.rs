//! Parquet serialization and writes.

use crate::core::runtime::run_blocking;
use crate::error::{FilestoreError, Result};
use crate::storage::Storage;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use std::path::Path;

/// Result of a Parquet write operation.
#[derive(Debug, Clone)]
pub struct ParquetWriteResult {
    /// Size of the written data in bytes.
    pub size_bytes: u64,
    pub row_count: usize,
}

/// Serialize a RecordBatch to Parquet format in memory.
///
/// `key_value_metadata` entries are stored in the file footer.
pub fn serialize_to_parquet(
    batch: &RecordBatch,
    key_value_metadata: &[(String, String)],
) -> Result<Bytes> {
    let span = tracing::info_span!(
        "parquet.serialize",
        row_count = batch.num_rows(),
        column_count = batch.num_columns()
    );
    let _span_guard = span.entered();

    let mut props_builder = WriterProperties::builder()
        .set_compression(Compression::ZSTD(zstd_level()))
        .set_max_row_group_size(128 * 1024); // 128K rows per group

    if !key_value_metadata.is_empty() {
        props_builder = props_builder.set_key_value_metadata(Some(
            key_value_metadata
                .iter()
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
                .collect(),
        ));
    }

    let props = props_builder.build();

    let mut buffer = Vec::with_capacity(64 * 1024);
    {
        let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), Some(props))
            .map_err(|e| FilestoreError::Parquet(e.to_string()))?;

        writer.write(batch).map_err(|e| FilestoreError::Parquet(e.to_string()))?;

        writer.close().map_err(|e| FilestoreError::Parquet(e.to_string()))?;
    }

    tracing::debug!(size_bytes = buffer.len(), "Parquet serialization completed");
    Ok(Bytes::from(buffer))
}

fn zstd_level() -> ZstdLevel {
    ZstdLevel::try_new(1).unwrap_or_default()
}

/// Serialize `batch` and replace the file at `path`.
pub async fn write_parquet(
    storage: &dyn Storage,
    path: &Path,
    batch: &RecordBatch,
    key_value_metadata: &[(String, String)],
) -> Result<ParquetWriteResult> {
    let bytes = serialize_to_parquet(batch, key_value_metadata)?;
    let size_bytes = bytes.len() as u64;
    storage.write_bytes(path, bytes).await?;
    Ok(ParquetWriteResult {
        size_bytes,
        row_count: batch.num_rows(),
    })
}

/// Synchronous wrapper for write_parquet.
pub fn write_parquet_sync(
    storage: &dyn Storage,
    path: &Path,
    batch: &RecordBatch,
    key_value_metadata: &[(String, String)],
) -> Result<ParquetWriteResult> {
    run_blocking(|| write_parquet(storage, path, batch, key_value_metadata))
}
