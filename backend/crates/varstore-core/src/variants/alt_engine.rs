//! TABULAR_ALT_ENGINE: plain Arrow batches.
//!
//! Same file set as the tabular variant, but the descriptor records Arrow
//! dtype names only and a read casts straight back without the object-column
//! transforms.

use super::tabular::{read_columnar, write_batch};
use super::VariantContext;
use crate::codec::{ColumnTypes, ColumnTypesFile, RecordedType};
use crate::error::{Result, VariableError};
use crate::options::ReadOptions;
use arrow::array::ArrayRef;
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use varstore_commons::arrow_conversion::dtype_name;
use varstore_commons::constants::{COLUMN_TYPES_FILE, PARQUET_FILE, PARQUET_SAMPLE_FILE};
use varstore_filestore::{read_json_file, write_json_file};

pub async fn write(ctx: VariantContext<'_>, batch: &RecordBatch) -> Result<()> {
    ctx.storage.makedirs(ctx.paths.variable_path(), true).await?;

    let column_types: ColumnTypes = batch
        .schema()
        .fields()
        .iter()
        .map(|field| (field.name().clone(), dtype_name(field.data_type())))
        .collect();
    write_json_file(
        ctx.storage,
        &ctx.file(COLUMN_TYPES_FILE),
        &ColumnTypesFile::Mapping(column_types),
    )
    .await?;

    write_batch(ctx, batch).await
}

pub async fn read(ctx: VariantContext<'_>, options: &ReadOptions) -> Result<RecordBatch> {
    let Some(table) = read_columnar(ctx, PARQUET_FILE, PARQUET_SAMPLE_FILE, options).await? else {
        return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
    };
    let mut batch = table.batch;
    if options.sample {
        let rows = ctx.sample_count(options).min(batch.num_rows());
        batch = batch.slice(0, rows);
    }

    let path = ctx.file(COLUMN_TYPES_FILE);
    let descriptor: Option<ColumnTypesFile> = read_json_file(ctx.storage, &path, None, options.strict)
        .await
        .map_err(|e| VariableError::read_failed(&path, e))?;
    match descriptor {
        Some(descriptor) => apply_column_types(batch, &descriptor.merged()),
        None => Ok(batch),
    }
}

/// Cast columns back to their recorded scalar types; anything else is left as read.
fn apply_column_types(batch: RecordBatch, column_types: &ColumnTypes) -> Result<RecordBatch> {
    let schema = batch.schema();
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };

    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());
    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        let target = column_types
            .get(field.name())
            .and_then(|name| RecordedType::parse(name, &[]).target())
            .filter(|target| target != column.data_type());

        let restored = match target {
            Some(target) => match cast_with_options(column.as_ref(), &target, &options) {
                Ok(array) => Some(array),
                Err(e) => {
                    log::warn!("Cannot cast column '{}' to {}: {}", field.name(), target, e);
                    None
                }
            },
            None => None,
        };

        match restored {
            Some(array) => {
                fields.push(Field::new(field.name(), array.data_type().clone(), true));
                columns.push(array);
            }
            None => {
                fields.push(field.as_ref().clone());
                columns.push(Arc::clone(column));
            }
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
