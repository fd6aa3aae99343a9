//! Read side of the column type codec: deserialize, then cast to the recorded type.
//!
//! Every step is best-effort. A column that cannot be restored keeps the
//! representation the columnar file gave it and a warning is logged.

use super::descriptor::{ColumnTypes, RecordedType};
use crate::error::{Result, VariableError};
use arrow::array::{Array, AsArray};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::DataType;
use std::sync::Arc;
use varstore_commons::arrow_conversion::{array_to_cells, cells_to_typed_array};
use varstore_commons::{Cell, Column, ColumnData, Frame};

/// Restore every column of `frame` that has a recorded type.
pub fn restore_frame(
    frame: Frame,
    column_types: &ColumnTypes,
    string_serializable: &[String],
) -> Result<Frame> {
    if column_types.is_empty() {
        return Ok(frame);
    }
    let columns = frame
        .into_columns()
        .into_iter()
        .map(|column| match column_types.get(&column.name) {
            Some(name) => {
                let recorded = RecordedType::parse(name, string_serializable);
                restore_column(column, &recorded)
            }
            None => column,
        })
        .collect();
    Ok(Frame::new(columns)?)
}

/// Best-effort restoration of one column.
pub fn restore_column(column: Column, recorded: &RecordedType) -> Column {
    let name = column.name.clone();
    match try_restore(column.data.clone(), recorded) {
        Ok(data) => Column::new(name, data),
        Err(e) => {
            log::warn!("{}", column_cast_error(&name, recorded, e));
            column
        }
    }
}

fn column_cast_error(name: &str, recorded: &RecordedType, err: VariableError) -> VariableError {
    VariableError::ColumnCast {
        column: name.to_string(),
        target: format!("{:?}", recorded),
        message: err.to_string(),
    }
}

fn try_restore(data: ColumnData, recorded: &RecordedType) -> Result<ColumnData> {
    match recorded {
        RecordedType::Native => Ok(data),
        RecordedType::Container => Ok(ColumnData::Object(deserialize_json_cells(&data)?)),
        RecordedType::Class(class) => {
            let cells = data
                .to_cells()?
                .into_iter()
                .map(|cell| match cell {
                    Cell::Null => Cell::Null,
                    cell @ Cell::Object { .. } => cell,
                    other => Cell::object(class.as_str(), other.display_string()),
                })
                .collect();
            Ok(ColumnData::Object(cells))
        }
        scalar => {
            let Some(target) = scalar.target() else {
                return Ok(data);
            };
            match data {
                ColumnData::Native(array) if array.data_type() == &target => {
                    Ok(ColumnData::Native(array))
                }
                ColumnData::Native(array) => {
                    let options = CastOptions {
                        safe: false,
                        ..Default::default()
                    };
                    Ok(ColumnData::Native(cast_with_options(
                        array.as_ref(),
                        &target,
                        &options,
                    )?))
                }
                ColumnData::Object(cells) => {
                    Ok(ColumnData::Native(cells_to_typed_array(&cells, &target)?))
                }
            }
        }
    }
}

/// Text cells written by the serialize transform become values again.
/// Cells that are not valid JSON stay as text.
fn deserialize_json_cells(data: &ColumnData) -> Result<Vec<Cell>> {
    let array = match data {
        ColumnData::Native(array) if array.data_type() == &DataType::Utf8 => Arc::clone(array),
        other => return Ok(other.to_cells()?),
    };
    let strings = array.as_string::<i32>();
    Ok((0..strings.len())
        .map(|i| {
            if strings.is_null(i) {
                return Cell::Null;
            }
            let text = strings.value(i);
            serde_json::from_str::<serde_json::Value>(text)
                .map(|value| Cell::from_json(&value))
                .unwrap_or_else(|_| Cell::Str(text.to_string()))
        })
        .collect())
}
