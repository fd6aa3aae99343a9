//! Conversion between Arrow arrays and object-column cells.
//!
//! - `array_to_cells`: any Arrow array into one `Cell` per row
//! - `cells_to_array`: homogeneous cells into the matching Arrow array (strict)
//! - `cells_to_typed_array`: cells coerced into a requested Arrow type
//! - `dtype_name`: stable type names recorded for Arrow-native columns

use crate::errors::{CommonError, Result};
use crate::models::cell::{Cell, InferredType};
use arrow::array::{
    new_null_array, Array, ArrayRef, AsArray, BinaryArray, BooleanArray, BooleanBuilder,
    Float64Array, Float64Builder, Int64Array, Int64Builder, ListBuilder, StringArray,
    StringBuilder, TimestampMicrosecondArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type, TimeUnit, TimestampMicrosecondType};
use chrono::DateTime;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Type name recorded for an Arrow-native column.
pub fn dtype_name(data_type: &DataType) -> String {
    match data_type {
        DataType::Null => "null".to_string(),
        DataType::Boolean => "bool".to_string(),
        DataType::Int8 => "int8".to_string(),
        DataType::Int16 => "int16".to_string(),
        DataType::Int32 => "int32".to_string(),
        DataType::Int64 => "int64".to_string(),
        DataType::UInt8 => "uint8".to_string(),
        DataType::UInt16 => "uint16".to_string(),
        DataType::UInt32 => "uint32".to_string(),
        DataType::UInt64 => "uint64".to_string(),
        DataType::Float16 => "float16".to_string(),
        DataType::Float32 => "float32".to_string(),
        DataType::Float64 => "float64".to_string(),
        DataType::Utf8 => "string".to_string(),
        DataType::LargeUtf8 => "large_string".to_string(),
        DataType::Utf8View => "string_view".to_string(),
        DataType::Binary | DataType::LargeBinary | DataType::BinaryView => "bytes".to_string(),
        DataType::Timestamp(unit, _) => format!("datetime64[{}]", unit_suffix(unit)),
        DataType::Date32 | DataType::Date64 => "date".to_string(),
        DataType::List(field) | DataType::LargeList(field) => {
            format!("list<{}>", dtype_name(field.data_type()))
        }
        DataType::Struct(_) => "struct".to_string(),
        other => other.to_string().to_lowercase(),
    }
}

fn unit_suffix(unit: &TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "s",
        TimeUnit::Millisecond => "ms",
        TimeUnit::Microsecond => "us",
        TimeUnit::Nanosecond => "ns",
    }
}

/// Convert every row of an Arrow array into a cell.
///
/// Types without a dedicated cell form are rendered through Arrow's string cast.
pub fn array_to_cells(array: &dyn Array) -> Result<Vec<Cell>> {
    let cells = match array.data_type() {
        DataType::Null => vec![Cell::Null; array.len()],
        DataType::Boolean => array.as_boolean().iter().map(Cell::from).collect(),
        DataType::Int64 => array.as_primitive::<Int64Type>().iter().map(Cell::from).collect(),
        dt if dt.is_integer() => {
            let casted = cast(array, &DataType::Int64)?;
            casted.as_primitive::<Int64Type>().iter().map(Cell::from).collect()
        }
        dt if dt.is_floating() => {
            let casted = cast(array, &DataType::Float64)?;
            casted.as_primitive::<Float64Type>().iter().map(Cell::from).collect()
        }
        DataType::Utf8 => array.as_string::<i32>().iter().map(Cell::from).collect(),
        DataType::LargeUtf8 => array.as_string::<i64>().iter().map(Cell::from).collect(),
        DataType::Binary => array
            .as_binary::<i32>()
            .iter()
            .map(|v| v.map_or(Cell::Null, |b| Cell::Bytes(b.to_vec())))
            .collect(),
        DataType::LargeBinary => array
            .as_binary::<i64>()
            .iter()
            .map(|v| v.map_or(Cell::Null, |b| Cell::Bytes(b.to_vec())))
            .collect(),
        DataType::Timestamp(_, tz) => {
            let casted = cast(array, &DataType::Timestamp(TimeUnit::Microsecond, tz.clone()))?;
            timestamp_cells(casted.as_ref())
        }
        DataType::Date32 | DataType::Date64 => {
            let casted = cast(array, &DataType::Timestamp(TimeUnit::Microsecond, None))?;
            timestamp_cells(casted.as_ref())
        }
        DataType::List(_) => array
            .as_list::<i32>()
            .iter()
            .map(|v| match v {
                Some(values) => array_to_cells(values.as_ref()).map(Cell::List),
                None => Ok(Cell::Null),
            })
            .collect::<Result<Vec<_>>>()?,
        DataType::LargeList(_) => array
            .as_list::<i64>()
            .iter()
            .map(|v| match v {
                Some(values) => array_to_cells(values.as_ref()).map(Cell::List),
                None => Ok(Cell::Null),
            })
            .collect::<Result<Vec<_>>>()?,
        DataType::Struct(fields) => {
            let struct_array = array.as_struct();
            let columns = struct_array
                .columns()
                .iter()
                .map(|c| array_to_cells(c.as_ref()))
                .collect::<Result<Vec<_>>>()?;
            (0..struct_array.len())
                .map(|row| {
                    if struct_array.is_null(row) {
                        return Cell::Null;
                    }
                    let entries: BTreeMap<String, Cell> = fields
                        .iter()
                        .zip(columns.iter())
                        .map(|(field, values)| (field.name().clone(), values[row].clone()))
                        .collect();
                    Cell::Dict(entries)
                })
                .collect()
        }
        _ => {
            let casted = cast(array, &DataType::Utf8)?;
            casted.as_string::<i32>().iter().map(Cell::from).collect()
        }
    };
    Ok(cells)
}

fn timestamp_cells(array: &dyn Array) -> Vec<Cell> {
    array
        .as_primitive::<TimestampMicrosecondType>()
        .iter()
        .map(|v| v.map_or(Cell::Null, Cell::Datetime))
        .collect()
}

/// Build an Arrow array from cells that share one kind.
///
/// Mixed columns, dictionaries and user objects are rejected so callers can
/// fall back to per-cell serialisation.
pub fn cells_to_array(cells: &[Cell]) -> Result<ArrayRef> {
    let array: ArrayRef = match InferredType::infer(cells) {
        InferredType::Empty => new_null_array(&DataType::Utf8, cells.len()),
        InferredType::Integer => Arc::new(Int64Array::from(
            cells
                .iter()
                .map(|c| if let Cell::Int(i) = c { Some(*i) } else { None })
                .collect::<Vec<_>>(),
        )),
        InferredType::Floating => Arc::new(Float64Array::from(
            cells
                .iter()
                .map(|c| if let Cell::Float(f) = c { Some(*f) } else { None })
                .collect::<Vec<_>>(),
        )),
        InferredType::Boolean => Arc::new(BooleanArray::from(
            cells
                .iter()
                .map(|c| if let Cell::Bool(b) = c { Some(*b) } else { None })
                .collect::<Vec<_>>(),
        )),
        InferredType::String => Arc::new(StringArray::from(
            cells
                .iter()
                .map(|c| if let Cell::Str(s) = c { Some(s.as_str()) } else { None })
                .collect::<Vec<_>>(),
        )),
        InferredType::Bytes => Arc::new(BinaryArray::from_opt_vec(
            cells
                .iter()
                .map(|c| if let Cell::Bytes(b) = c { Some(b.as_slice()) } else { None })
                .collect(),
        )),
        InferredType::Datetime => Arc::new(
            TimestampMicrosecondArray::from(
                cells
                    .iter()
                    .map(|c| if let Cell::Datetime(t) = c { Some(*t) } else { None })
                    .collect::<Vec<_>>(),
            )
            .with_timezone("UTC"),
        ),
        _ if cells.iter().all(|c| matches!(c, Cell::List(_) | Cell::Null)) => {
            list_array(cells)?
        }
        inferred => {
            return Err(CommonError::Unrepresentable(format!(
                "{} values of kind '{}'",
                cells.len(),
                inferred
            )))
        }
    };
    Ok(array)
}

macro_rules! build_list {
    ($cells:expr, $builder:expr, $variant:ident) => {{
        let mut builder = ListBuilder::new($builder);
        for cell in $cells {
            match cell {
                Cell::List(items) => {
                    for item in items {
                        match item {
                            Cell::$variant(v) => builder.values().append_value(v.clone()),
                            _ => builder.values().append_null(),
                        }
                    }
                    builder.append(true);
                }
                _ => builder.append_null(),
            }
        }
        Arc::new(builder.finish()) as ArrayRef
    }};
}

fn list_array(cells: &[Cell]) -> Result<ArrayRef> {
    let items = cells
        .iter()
        .filter_map(|c| if let Cell::List(items) = c { Some(items) } else { None })
        .flatten();

    let array = match InferredType::infer(items) {
        InferredType::Empty | InferredType::Integer => {
            build_list!(cells, Int64Builder::new(), Int)
        }
        InferredType::Floating => build_list!(cells, Float64Builder::new(), Float),
        InferredType::Boolean => build_list!(cells, BooleanBuilder::new(), Bool),
        InferredType::String => build_list!(cells, StringBuilder::new(), Str),
        inferred => {
            return Err(CommonError::Unrepresentable(format!(
                "lists with items of kind '{}'",
                inferred
            )))
        }
    };
    Ok(array)
}

/// Coerce cells into an array of `target` type.
///
/// Fails on the first cell that cannot be converted; callers decide whether the
/// failure is fatal.
pub fn cells_to_typed_array(cells: &[Cell], target: &DataType) -> Result<ArrayRef> {
    let array: ArrayRef = match target {
        DataType::Utf8 => Arc::new(StringArray::from(
            cells
                .iter()
                .map(|c| (!c.is_null()).then(|| c.display_string()))
                .collect::<Vec<_>>(),
        )),
        DataType::Int64 => Arc::new(Int64Array::from(
            cells.iter().map(cell_to_i64).collect::<Result<Vec<_>>>()?,
        )),
        DataType::Float64 => Arc::new(Float64Array::from(
            cells.iter().map(cell_to_f64).collect::<Result<Vec<_>>>()?,
        )),
        DataType::Boolean => Arc::new(BooleanArray::from(
            cells.iter().map(cell_to_bool).collect::<Result<Vec<_>>>()?,
        )),
        DataType::Timestamp(TimeUnit::Microsecond, tz) => Arc::new(
            TimestampMicrosecondArray::from(
                cells.iter().map(cell_to_micros).collect::<Result<Vec<_>>>()?,
            )
            .with_timezone_opt(tz.clone()),
        ),
        DataType::Binary => {
            let values = cells.iter().map(cell_to_bytes).collect::<Result<Vec<_>>>()?;
            Arc::new(BinaryArray::from_opt_vec(
                values.iter().map(|v| v.as_deref()).collect(),
            ))
        }
        other => {
            let array = cells_to_array(cells)?;
            cast(array.as_ref(), other)?
        }
    };
    Ok(array)
}

fn cast_error(cell: &Cell, target: &str) -> CommonError {
    CommonError::Cast {
        value: format!("{:?}", cell),
        target: target.to_string(),
    }
}

fn cell_to_i64(cell: &Cell) -> Result<Option<i64>> {
    match cell {
        Cell::Null => Ok(None),
        Cell::Int(i) => Ok(Some(*i)),
        Cell::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(Some(*f as i64)),
        Cell::Bool(b) => Ok(Some(i64::from(*b))),
        Cell::Str(s) => s.trim().parse::<i64>().map(Some).map_err(|_| cast_error(cell, "int")),
        _ => Err(cast_error(cell, "int")),
    }
}

fn cell_to_f64(cell: &Cell) -> Result<Option<f64>> {
    match cell {
        Cell::Null => Ok(None),
        Cell::Int(i) => Ok(Some(*i as f64)),
        Cell::Float(f) => Ok(Some(*f)),
        Cell::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Cell::Str(s) => s.trim().parse::<f64>().map(Some).map_err(|_| cast_error(cell, "float")),
        _ => Err(cast_error(cell, "float")),
    }
}

fn cell_to_bool(cell: &Cell) -> Result<Option<bool>> {
    match cell {
        Cell::Null => Ok(None),
        Cell::Bool(b) => Ok(Some(*b)),
        Cell::Int(i) => Ok(Some(*i != 0)),
        Cell::Float(f) => Ok(Some(*f != 0.0)),
        Cell::Str(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(cast_error(cell, "bool")),
        },
        _ => Err(cast_error(cell, "bool")),
    }
}

fn cell_to_micros(cell: &Cell) -> Result<Option<i64>> {
    match cell {
        Cell::Null => Ok(None),
        Cell::Datetime(t) | Cell::Int(t) => Ok(Some(*t)),
        Cell::Str(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| Some(dt.timestamp_micros()))
            .map_err(|_| cast_error(cell, "datetime")),
        _ => Err(cast_error(cell, "datetime")),
    }
}

fn cell_to_bytes(cell: &Cell) -> Result<Option<Vec<u8>>> {
    match cell {
        Cell::Null => Ok(None),
        Cell::Bytes(b) => Ok(Some(b.clone())),
        Cell::Str(s) => Ok(Some(s.as_bytes().to_vec())),
        _ => Err(cast_error(cell, "bytes")),
    }
}
