//! GEOSPATIAL: geo frames as Parquet with `geo` footer metadata.
//!
//! The geometry column holds WKT text. Column types ride along in the footer
//! too, so object columns come back the way the tabular variant restores them.

use super::tabular::{read_columnar, sample_batch};
use super::VariantContext;
use crate::codec::{encode_frame, restore_frame, ColumnTypes};
use crate::error::{Result, VariableError};
use crate::options::ReadOptions;
use arrow::record_batch::RecordBatch;
use varstore_commons::constants::{GEO_FILE, GEO_METADATA_KEY, GEO_SAMPLE_FILE};
use varstore_commons::{Frame, GeoFrame, VariableValue};
use varstore_filestore::write_parquet;

/// Footer key holding the column type descriptor.
const COLUMN_TYPES_KEY: &str = "column_types";

pub async fn write(ctx: VariantContext<'_>, geo: &GeoFrame) -> Result<()> {
    ctx.ensure_dir().await?;

    let encoded = encode_frame(&geo.frame, ctx.settings)?;
    let batch: RecordBatch = if encoded.needs_serialization() {
        encoded
            .to_native_batch()
            .or_else(|_| encoded.to_serialized_batch(ctx.settings))?
    } else {
        encoded.to_native_batch()?
    };

    let column_types = serde_json::to_string(&encoded.column_types)
        .map_err(|e| VariableError::Codec(e.to_string()))?;
    let metadata = vec![
        (GEO_METADATA_KEY.to_string(), geo.geo_metadata()),
        (COLUMN_TYPES_KEY.to_string(), column_types),
    ];

    write_parquet(ctx.storage, &ctx.file(GEO_FILE), &batch, &metadata).await?;

    let sample_path = ctx.file(GEO_SAMPLE_FILE);
    let written = match sample_batch(&batch, ctx.settings.sample_count, batch.num_columns()) {
        Ok(sample) => write_parquet(ctx.storage, &sample_path, &sample, &metadata)
            .await
            .map_err(VariableError::from),
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        log::warn!("Sample output error for {}: {}", sample_path.display(), e);
    }
    Ok(())
}

pub async fn read(ctx: VariantContext<'_>, options: &ReadOptions) -> Result<VariableValue> {
    let Some(table) = read_columnar(ctx, GEO_FILE, GEO_SAMPLE_FILE, options).await? else {
        return Ok(VariableValue::Frame(Frame::default()));
    };

    let mut frame = Frame::from_record_batch(&table.batch)?;
    if options.sample {
        frame = frame.head(ctx.sample_count(options));
    }

    let metadata = &table.key_value_metadata;
    if let Some(types) = metadata.get(COLUMN_TYPES_KEY) {
        match serde_json::from_str::<ColumnTypes>(types) {
            Ok(types) => {
                frame = restore_frame(frame, &types, &ctx.settings.string_serializable_types)?
            }
            Err(e) => log::warn!("Ignoring unreadable column types in geo footer: {}", e),
        }
    }

    match metadata.get(GEO_METADATA_KEY) {
        Some(geo) => Ok(VariableValue::Geo(GeoFrame::from_geo_metadata(frame, geo)?)),
        None => {
            log::warn!(
                "Geo file at {} has no geo metadata",
                ctx.paths.variable_path().display()
            );
            Ok(VariableValue::Frame(frame))
        }
    }
}
