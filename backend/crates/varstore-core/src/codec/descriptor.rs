//! `data_column_types.json` contents and the meaning of recorded type names.

use arrow::datatypes::{DataType, TimeUnit};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Column name -> recorded type name.
pub type ColumnTypes = BTreeMap<String, String>;

/// One series packed into a shared columnar file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesColumns {
    /// Packed column name (`{name}_{position}`) -> original series name.
    pub column_mapping: BTreeMap<String, String>,
    pub column_types: ColumnTypes,
    pub index: Vec<JsonValue>,
}

/// Either a plain mapping (tables, single series) or one record per packed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnTypesFile {
    Mapping(ColumnTypes),
    Series(Vec<SeriesColumns>),
}

impl ColumnTypesFile {
    /// All recorded types in one mapping.
    pub fn merged(&self) -> ColumnTypes {
        match self {
            ColumnTypesFile::Mapping(types) => types.clone(),
            ColumnTypesFile::Series(records) => records
                .iter()
                .flat_map(|r| r.column_types.clone())
                .collect(),
        }
    }
}

/// How a recorded type name is applied when a column is read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedType {
    Text,
    Integer,
    Float,
    Boolean,
    Datetime,
    /// Nested values stored as JSON text.
    Container,
    /// User class reconstructed from its string form.
    Class(String),
    /// Arrow-native dtype name; nothing to do.
    Native,
}

impl RecordedType {
    pub fn parse(name: &str, string_serializable: &[String]) -> Self {
        if string_serializable.iter().any(|s| s == name) {
            return RecordedType::Class(name.to_string());
        }
        match name {
            "str" | "string" => RecordedType::Text,
            "int" | "int64" => RecordedType::Integer,
            "float" | "float64" => RecordedType::Float,
            "bool" | "boolean" => RecordedType::Boolean,
            "datetime" => RecordedType::Datetime,
            "list" | "dict" | "tuple" | "ndarray" => RecordedType::Container,
            // Class names are capitalised; Arrow dtype names never are
            other if other.starts_with(|c: char| c.is_ascii_uppercase()) => {
                RecordedType::Class(other.to_string())
            }
            _ => RecordedType::Native,
        }
    }

    /// Arrow type the column is cast to, for scalar recorded types.
    pub fn target(&self) -> Option<DataType> {
        match self {
            RecordedType::Text => Some(DataType::Utf8),
            RecordedType::Integer => Some(DataType::Int64),
            RecordedType::Float => Some(DataType::Float64),
            RecordedType::Boolean => Some(DataType::Boolean),
            RecordedType::Datetime => {
                Some(DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())))
            }
            _ => None,
        }
    }

    /// Values of this type are written through the per-cell serialize transform.
    pub fn needs_serialization(&self) -> bool {
        matches!(self, RecordedType::Container | RecordedType::Class(_))
    }
}
