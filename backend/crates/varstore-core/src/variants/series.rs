//! SERIES: one series, or a list of them, stored in the tabular layout.
//!
//! A single series becomes a one-column frame (plus `__index_level_0__` when
//! its index is not the default range). A list is packed side by side as
//! `{name}_{position}` columns padded to the longest series; the descriptor
//! then holds one record per series with its column mapping, column types and
//! index. Values of any other shape are rejected; the facade stores those
//! generically.

use super::{generic, tabular, unsupported, VariantContext};
use crate::codec::{
    encode_frame, restore_column, restore_frame, ColumnTypes, ColumnTypesFile, EncodedFrame,
    RecordedType, SeriesColumns,
};
use crate::error::{Result, VariableError};
use crate::options::ReadOptions;
use arrow::array::{new_null_array, Array};
use arrow::compute::concat;
use std::collections::BTreeMap;
use varstore_commons::constants::{INDEX_COLUMN, JSON_FILE, PARQUET_FILE};
use varstore_commons::{Cell, Column, ColumnData, Frame, Series, VariableType, VariableValue};
use varstore_configs::VariableSettings;

const UNNAMED_SERIES: &str = "0";

pub async fn write(ctx: VariantContext<'_>, value: &VariableValue) -> Result<()> {
    match value {
        VariableValue::Series(series) => {
            let encoded = encode_frame(&single_frame(series)?, ctx.settings)?;
            let descriptor = ColumnTypesFile::Mapping(encoded.column_types.clone());
            tabular::write_encoded(ctx, &encoded, &descriptor).await
        }
        VariableValue::SeriesList(list) => {
            let (encoded, records) = pack(list, ctx.settings)?;
            tabular::write_encoded(ctx, &encoded, &ColumnTypesFile::Series(records)).await
        }
        other => Err(unsupported(VariableType::Series, other)),
    }
}

pub async fn read(ctx: VariantContext<'_>, options: &ReadOptions) -> Result<VariableValue> {
    // Non-series values written under this tag live in the generic records
    if !ctx.storage.path_exists(&ctx.file(PARQUET_FILE)).await?
        && ctx.storage.path_exists(&ctx.file(JSON_FILE)).await?
    {
        return Ok(VariableValue::Json(generic::read(ctx, options).await?));
    }

    let stored = tabular::read_table(ctx, options).await?;
    let string_serializable = &ctx.settings.string_serializable_types;

    match stored.descriptor {
        Some(ColumnTypesFile::Series(records)) => Ok(VariableValue::SeriesList(unpack(
            &stored.frame,
            &records,
            string_serializable,
        )?)),
        Some(ColumnTypesFile::Mapping(types)) => {
            single_series(restore_frame(stored.frame, &types, string_serializable)?)
        }
        None => single_series(stored.frame),
    }
}

fn series_name(series: &Series) -> &str {
    if series.name.is_empty() {
        UNNAMED_SERIES
    } else {
        &series.name
    }
}

fn single_frame(series: &Series) -> Result<Frame> {
    if series.name == INDEX_COLUMN {
        return Err(VariableError::Codec(format!(
            "Series name '{}' is reserved for the stored index",
            INDEX_COLUMN
        )));
    }
    let mut columns = vec![Column::new(series_name(series), series.data.clone())];
    if !series.has_default_index() {
        columns.push(Column::object(INDEX_COLUMN, series.index.clone()));
    }
    Ok(Frame::new(columns)?)
}

/// Back from the one-column layout. A frame without a data column is returned as is.
fn single_series(frame: Frame) -> Result<VariableValue> {
    let Some(data) = frame.columns().iter().find(|c| c.name != INDEX_COLUMN) else {
        return Ok(VariableValue::Frame(frame));
    };
    let series = match frame.column(INDEX_COLUMN) {
        Some(index) => Series::with_index(
            data.name.clone(),
            data.data.clone(),
            index.data.to_cells()?,
        )?,
        None => Series::new(data.name.clone(), data.data.clone()),
    };
    Ok(VariableValue::Series(series))
}

/// Side-by-side layout of a series list, padded to the longest series.
fn pack(list: &[Series], settings: &VariableSettings) -> Result<(EncodedFrame, Vec<SeriesColumns>)> {
    let rows = list.iter().map(Series::len).max().unwrap_or(0);
    let mut columns = Vec::with_capacity(list.len());
    let mut records = Vec::with_capacity(list.len());
    let mut column_types = ColumnTypes::new();

    for (position, series) in list.iter().enumerate() {
        let name = series_name(series);
        let packed = format!("{}_{}", name, position);

        let single = Frame::new(vec![Column::new(packed.clone(), series.data.clone())])?;
        let encoded = encode_frame(&single, settings)?;
        let column = encoded
            .frame
            .into_columns()
            .pop()
            .ok_or_else(|| VariableError::Codec(format!("Series '{}' lost its column", packed)))?;
        columns.push(pad(column, rows)?);

        column_types.extend(encoded.column_types.clone());
        records.push(SeriesColumns {
            column_mapping: BTreeMap::from([(packed, name.to_string())]),
            column_types: encoded.column_types,
            index: series.index.iter().map(Cell::to_json).collect(),
        });
    }

    let frame = Frame::new(columns)?;
    Ok((EncodedFrame { frame, column_types }, records))
}

fn pad(column: Column, rows: usize) -> Result<Column> {
    let missing = rows.saturating_sub(column.data.len());
    if missing == 0 {
        return Ok(column);
    }
    let data = match column.data {
        ColumnData::Native(array) => {
            let nulls = new_null_array(array.data_type(), missing);
            ColumnData::Native(concat(&[array.as_ref(), nulls.as_ref()])?)
        }
        ColumnData::Object(mut cells) => {
            cells.resize(rows, Cell::Null);
            ColumnData::Object(cells)
        }
    };
    Ok(Column::new(column.name, data))
}

/// Rebuild each series from its packed column, trimmed to the stored index length.
fn unpack(
    frame: &Frame,
    records: &[SeriesColumns],
    string_serializable: &[String],
) -> Result<Vec<Series>> {
    let mut list = Vec::with_capacity(records.len());
    for record in records {
        let index: Vec<Cell> = record.index.iter().map(Cell::from_json).collect();
        let rows = index.len().min(frame.num_rows());

        for (packed, name) in &record.column_mapping {
            let Some(column) = frame.column(packed) else {
                log::warn!("Packed series column '{}' missing from stored data", packed);
                continue;
            };
            let recorded = record
                .column_types
                .get(packed)
                .map(|t| RecordedType::parse(t, string_serializable))
                .unwrap_or(RecordedType::Native);
            let restored = restore_column(column.clone(), &recorded);
            list.push(Series::with_index(
                name.clone(),
                restored.data.slice(0, rows),
                index[..rows].to_vec(),
            )?);
        }
    }
    Ok(list)
}
