//! TABULAR: frames as `data.parquet` + `sample_data.parquet` + `data_column_types.json`.
//!
//! Object columns that survive the codec are first written natively (Arrow
//! lists and structs). The native output is verified by reading the sample
//! back; on any failure the object columns are serialized cell by cell and the
//! file is rewritten.

use super::VariantContext;
use crate::codec::{encode_frame, restore_frame, ColumnTypesFile, EncodedFrame};
use crate::error::{Result, VariableError};
use crate::options::ReadOptions;
use arrow::record_batch::RecordBatch;
use varstore_commons::constants::{COLUMN_TYPES_FILE, PARQUET_FILE, PARQUET_SAMPLE_FILE};
use varstore_commons::Frame;
use varstore_filestore::{read_json_file, read_parquet, write_json_file, write_parquet, ParquetTable};

/// Frame as stored, with its column type descriptor when one exists.
#[derive(Debug, Clone)]
pub struct StoredTable {
    pub frame: Frame,
    pub descriptor: Option<ColumnTypesFile>,
}

pub async fn write(ctx: VariantContext<'_>, frame: &Frame) -> Result<()> {
    let encoded = encode_frame(frame, ctx.settings)?;
    let descriptor = ColumnTypesFile::Mapping(encoded.column_types.clone());
    write_encoded(ctx, &encoded, &descriptor).await
}

/// Persist an already encoded frame under `descriptor`.
pub async fn write_encoded(
    ctx: VariantContext<'_>,
    encoded: &EncodedFrame,
    descriptor: &ColumnTypesFile,
) -> Result<()> {
    ctx.storage.makedirs(ctx.paths.variable_path(), true).await?;
    write_json_file(ctx.storage, &ctx.file(COLUMN_TYPES_FILE), descriptor).await?;

    if !encoded.needs_serialization() {
        return write_batch(ctx, &encoded.to_native_batch()?).await;
    }

    match write_native(ctx, encoded).await {
        Ok(()) => Ok(()),
        Err(e) => {
            log::debug!(
                "Native write of {} rejected, serializing object columns: {}",
                ctx.paths.variable_path().display(),
                e
            );
            write_batch(ctx, &encoded.to_serialized_batch(ctx.settings)?).await
        }
    }
}

async fn write_native(ctx: VariantContext<'_>, encoded: &EncodedFrame) -> Result<()> {
    write_batch(ctx, &encoded.to_native_batch()?).await?;
    read(ctx, &ReadOptions::sampled().strict()).await?;
    Ok(())
}

/// Write the full file, then the bounded sample (sample failures are only logged).
pub async fn write_batch(ctx: VariantContext<'_>, batch: &RecordBatch) -> Result<()> {
    let result = write_parquet(ctx.storage, &ctx.file(PARQUET_FILE), batch, &[]).await?;
    log::debug!(
        "Wrote {} rows ({} bytes) to {}",
        result.row_count,
        result.size_bytes,
        ctx.paths.variable_path().display()
    );

    let sample_path = ctx.file(PARQUET_SAMPLE_FILE);
    let sample = sample_batch(
        batch,
        ctx.settings.sample_count,
        ctx.settings.sample_max_columns,
    );
    let written = match sample {
        Ok(sample) => write_parquet(ctx.storage, &sample_path, &sample, &[])
            .await
            .map_err(VariableError::from),
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        log::warn!("Sample output error for {}: {}", sample_path.display(), e);
    }
    Ok(())
}

/// First `max_rows` rows of the first `max_columns` columns.
pub fn sample_batch(batch: &RecordBatch, max_rows: usize, max_columns: usize) -> Result<RecordBatch> {
    let rows = batch.slice(0, max_rows.min(batch.num_rows()));
    let projection: Vec<usize> = (0..max_columns.min(batch.num_columns())).collect();
    Ok(rows.project(&projection)?)
}

/// Load `full`, or `sample` first when the read is sampled.
///
/// A missing file yields `None`. Other failures yield `None` as well unless the
/// read is strict.
pub async fn read_columnar(
    ctx: VariantContext<'_>,
    full: &str,
    sample: &str,
    options: &ReadOptions,
) -> Result<Option<ParquetTable>> {
    if options.sample {
        let path = ctx.file(sample);
        match read_parquet(ctx.storage, &path).await {
            Ok(table) => return Ok(Some(table)),
            Err(e) if e.is_not_found() => {}
            Err(e) if options.strict => return Err(VariableError::read_failed(&path, e)),
            Err(e) => log::warn!(
                "Sample {} unreadable, falling back to full data: {}",
                path.display(),
                e
            ),
        }
    }

    let path = ctx.file(full);
    match read_parquet(ctx.storage, &path).await {
        Ok(table) => Ok(Some(table)),
        Err(e) if e.is_not_found() => {
            log::debug!("No columnar data at {}", path.display());
            Ok(None)
        }
        Err(e) if options.strict => Err(VariableError::read_failed(&path, e)),
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

/// Stored frame (sample-bounded when requested) plus its descriptor, not yet restored.
pub async fn read_table(ctx: VariantContext<'_>, options: &ReadOptions) -> Result<StoredTable> {
    let table = read_columnar(ctx, PARQUET_FILE, PARQUET_SAMPLE_FILE, options).await?;
    let mut frame = match table {
        Some(table) => Frame::from_record_batch(&table.batch)?,
        None => Frame::default(),
    };
    if options.sample {
        frame = frame.head(ctx.sample_count(options));
    }

    let descriptor_path = ctx.file(COLUMN_TYPES_FILE);
    let descriptor: Option<ColumnTypesFile> =
        read_json_file(ctx.storage, &descriptor_path, None, options.strict)
            .await
            .map_err(|e| VariableError::read_failed(&descriptor_path, e))?;

    Ok(StoredTable { frame, descriptor })
}

pub async fn read(ctx: VariantContext<'_>, options: &ReadOptions) -> Result<Frame> {
    let StoredTable { frame, descriptor } = read_table(ctx, options).await?;
    match descriptor {
        Some(descriptor) => restore_frame(
            frame,
            &descriptor.merged(),
            &ctx.settings.string_serializable_types,
        ),
        None => Ok(frame),
    }
}
