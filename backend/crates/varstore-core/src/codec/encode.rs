//! Write side of the column type codec.
//!
//! Native columns are recorded by dtype name and left alone. Object columns are
//! inspected through their first non-null element and their inferred logical
//! type, then cast to a native array where that is safe. Columns that cannot be
//! cast stay object columns and are handled by the writer, either natively
//! (homogeneous lists) or through [`serialize_object_columns`].

use super::descriptor::{ColumnTypes, RecordedType};
use crate::error::Result;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use varstore_commons::arrow_conversion::{cells_to_typed_array, dtype_name};
use varstore_commons::{Cell, Column, ColumnData, Frame, InferredType};
use varstore_configs::VariableSettings;

/// A frame made safe for the columnar format, plus what it used to be.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub frame: Frame,
    pub column_types: ColumnTypes,
}

impl EncodedFrame {
    /// Object columns remain, so the plain Arrow conversion may not succeed.
    pub fn needs_serialization(&self) -> bool {
        self.frame.has_object_columns()
    }

    /// Arrow batch with object columns converted natively (fails on mixed content).
    pub fn to_native_batch(&self) -> Result<RecordBatch> {
        Ok(self.frame.to_record_batch()?)
    }

    /// Arrow batch with every object column serialized cell by cell.
    pub fn to_serialized_batch(&self, settings: &VariableSettings) -> Result<RecordBatch> {
        let frame = serialize_object_columns(&self.frame, &self.column_types, settings)?;
        Ok(frame.to_record_batch()?)
    }
}

enum CastTarget {
    /// Defensive cast to text.
    Text,
    /// Cast to the column's own element type.
    Own(DataType),
    Keep,
}

/// Compute the column type descriptor and the column-safe projection of `frame`.
pub fn encode_frame(frame: &Frame, settings: &VariableSettings) -> Result<EncodedFrame> {
    let mut column_types = ColumnTypes::new();
    let mut columns = Vec::with_capacity(frame.num_columns());

    for column in frame.columns() {
        let (encoded, recorded) = encode_column(column, settings);
        if let Some(recorded) = recorded {
            column_types.insert(column.name.clone(), recorded);
        }
        columns.push(encoded);
    }

    Ok(EncodedFrame {
        frame: Frame::new(columns)?,
        column_types,
    })
}

fn encode_column(column: &Column, settings: &VariableSettings) -> (Column, Option<String>) {
    let cells = match &column.data {
        ColumnData::Native(array) => {
            return (column.clone(), Some(dtype_name(array.data_type())));
        }
        ColumnData::Object(cells) => cells,
    };

    let non_null: Vec<&Cell> = cells.iter().filter(|c| !c.is_null()).collect();
    let Some(first) = non_null.first() else {
        return (column.clone(), None);
    };
    let class = first.class_name().to_string();
    let inferred = InferredType::infer(non_null.iter().copied());
    let string_serializable = settings.string_serializable_types.contains(&class);

    let target = if string_serializable {
        CastTarget::Text
    } else if first.is_primitive()
        && settings
            .ambiguous_column_types
            .iter()
            .any(|t| t == inferred.as_str())
    {
        CastTarget::Text
    } else {
        own_target(inferred)
    };

    let (data_type, recorded) = match target {
        CastTarget::Keep => return (column.clone(), Some(class)),
        CastTarget::Text if string_serializable => (DataType::Utf8, class.clone()),
        CastTarget::Text => (DataType::Utf8, "str".to_string()),
        CastTarget::Own(data_type) => {
            let recorded = match inferred {
                InferredType::MixedIntegerFloat => "float".to_string(),
                _ => class.clone(),
            };
            (data_type, recorded)
        }
    };

    match cells_to_typed_array(cells, &data_type) {
        Ok(array) => (Column::native(column.name.clone(), array), Some(recorded)),
        Err(e) => {
            log::debug!(
                "Column '{}' kept as {} values, cast to {} failed: {}",
                column.name,
                class,
                data_type,
                e
            );
            (column.clone(), Some(class))
        }
    }
}

fn own_target(inferred: InferredType) -> CastTarget {
    match inferred {
        InferredType::Integer => CastTarget::Own(DataType::Int64),
        InferredType::Floating | InferredType::MixedIntegerFloat => {
            CastTarget::Own(DataType::Float64)
        }
        InferredType::Boolean => CastTarget::Own(DataType::Boolean),
        InferredType::String => CastTarget::Own(DataType::Utf8),
        InferredType::Bytes => CastTarget::Own(DataType::Binary),
        InferredType::Datetime => CastTarget::Own(DataType::Timestamp(
            TimeUnit::Microsecond,
            Some("UTC".into()),
        )),
        _ => CastTarget::Keep,
    }
}

/// Replace every object column with per-cell text.
///
/// User classes are stored as their string form; everything else as JSON so
/// nested values and scalars of mixed kinds come back intact.
pub fn serialize_object_columns(
    frame: &Frame,
    column_types: &ColumnTypes,
    settings: &VariableSettings,
) -> Result<Frame> {
    let columns = frame
        .columns()
        .iter()
        .map(|column| match &column.data {
            ColumnData::Native(_) => column.clone(),
            ColumnData::Object(cells) => {
                let as_class = column_types.get(&column.name).is_some_and(|name| {
                    matches!(
                        RecordedType::parse(name, &settings.string_serializable_types),
                        RecordedType::Class(_)
                    )
                });
                Column::native(column.name.clone(), serialize_cells(cells, as_class))
            }
        })
        .collect();
    Ok(Frame::new(columns)?)
}

fn serialize_cells(cells: &[Cell], as_class: bool) -> ArrayRef {
    let values: Vec<Option<String>> = cells
        .iter()
        .map(|cell| match cell {
            Cell::Null => None,
            cell if as_class => Some(cell.display_string()),
            cell => Some(cell.to_json().to_string()),
        })
        .collect();
    Arc::new(StringArray::from(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int64Array};
    use std::collections::BTreeMap;

    fn settings() -> VariableSettings {
        VariableSettings::default()
    }

    fn native_type<'a>(encoded: &'a EncodedFrame, name: &str) -> Option<&'a DataType> {
        match &encoded.frame.column(name)?.data {
            ColumnData::Native(array) => Some(array.data_type()),
            ColumnData::Object(_) => None,
        }
    }

    #[test]
    fn test_mixed_column_cast_to_string() {
        let frame = Frame::new(vec![
            Column::native("a", Arc::new(Int64Array::from(vec![1, 2, 3]))),
            Column::object("b", vec![Cell::from("x"), Cell::Int(2), Cell::from("z")]),
        ])
        .unwrap();

        let encoded = encode_frame(&frame, &settings()).unwrap();
        assert_eq!(encoded.column_types.get("a").map(String::as_str), Some("int64"));
        assert_eq!(encoded.column_types.get("b").map(String::as_str), Some("str"));
        assert_eq!(native_type(&encoded, "b"), Some(&DataType::Utf8));
        assert_eq!(
            encoded.frame.column_cells("b").unwrap(),
            vec![Cell::from("x"), Cell::from("2"), Cell::from("z")]
        );
        assert!(!encoded.needs_serialization());
    }

    #[test]
    fn test_homogeneous_object_column_cast_to_own_type() {
        let frame = Frame::new(vec![Column::object(
            "n",
            vec![Cell::Int(1), Cell::Null, Cell::Int(3)],
        )])
        .unwrap();
        let encoded = encode_frame(&frame, &settings()).unwrap();
        assert_eq!(encoded.column_types.get("n").map(String::as_str), Some("int"));
        assert_eq!(native_type(&encoded, "n"), Some(&DataType::Int64));
    }

    #[test]
    fn test_string_serializable_records_class() {
        let frame = Frame::new(vec![Column::object(
            "id",
            vec![Cell::object("ObjectId", "65a1"), Cell::object("ObjectId", "65a2")],
        )])
        .unwrap();
        let encoded = encode_frame(&frame, &settings()).unwrap();
        assert_eq!(encoded.column_types.get("id").map(String::as_str), Some("ObjectId"));
        assert_eq!(
            encoded.frame.column_cells("id").unwrap(),
            vec![Cell::from("65a1"), Cell::from("65a2")]
        );
    }

    #[test]
    fn test_containers_stay_object() {
        let mut dict = BTreeMap::new();
        dict.insert("k".to_string(), Cell::Int(1));
        let frame = Frame::new(vec![
            Column::object("d", vec![Cell::Dict(dict), Cell::Null]),
            Column::object("empty", vec![Cell::Null, Cell::Null]),
        ])
        .unwrap();

        let encoded = encode_frame(&frame, &settings()).unwrap();
        assert_eq!(encoded.column_types.get("d").map(String::as_str), Some("dict"));
        assert!(!encoded.column_types.contains_key("empty"));
        assert!(encoded.needs_serialization());
        assert!(encoded.to_native_batch().is_err());

        let batch = encoded.to_serialized_batch(&settings()).unwrap();
        let d = batch.column(0);
        assert_eq!(d.data_type(), &DataType::Utf8);
        assert!(d.is_null(1));
    }

    #[test]
    fn test_mixed_numbers_widen_to_float() {
        let frame = Frame::new(vec![Column::object(
            "x",
            vec![Cell::Int(1), Cell::Float(2.5)],
        )])
        .unwrap();
        let encoded = encode_frame(&frame, &settings()).unwrap();
        assert_eq!(encoded.column_types.get("x").map(String::as_str), Some("float"));
        assert_eq!(native_type(&encoded, "x"), Some(&DataType::Float64));
    }
}
