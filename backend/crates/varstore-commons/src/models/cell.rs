//! Dynamically-typed cell values.
//!
//! Object columns hold one `Cell` per row. Cells know their class name, can be
//! rendered as text, and convert to and from JSON so they can be packed into a
//! columnar file as per-cell text and restored on read.

use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// A single value in an object column.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Microseconds since the Unix epoch, UTC.
    Datetime(i64),
    List(Vec<Cell>),
    Dict(BTreeMap<String, Cell>),
    /// Instance of a user class that round-trips through its string form.
    Object { class: String, repr: String },
}

impl Cell {
    /// Build an opaque object cell.
    pub fn object(class: impl Into<String>, repr: impl Into<String>) -> Self {
        Cell::Object {
            class: class.into(),
            repr: repr.into(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Runtime class name, as recorded in column type descriptors.
    pub fn class_name(&self) -> &str {
        match self {
            Cell::Null => "null",
            Cell::Bool(_) => "bool",
            Cell::Int(_) => "int",
            Cell::Float(_) => "float",
            Cell::Str(_) => "str",
            Cell::Bytes(_) => "bytes",
            Cell::Datetime(_) => "datetime",
            Cell::List(_) => "list",
            Cell::Dict(_) => "dict",
            Cell::Object { class, .. } => class,
        }
    }

    /// Plain scalars carry no attributes of their own; containers and user objects do.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Cell::Bool(_)
                | Cell::Int(_)
                | Cell::Float(_)
                | Cell::Str(_)
                | Cell::Bytes(_)
                | Cell::Datetime(_)
        )
    }

    /// Text form used when a column is cast to string.
    pub fn display_string(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Str(s) => s.clone(),
            Cell::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Cell::Datetime(micros) => format_datetime(*micros),
            Cell::List(_) | Cell::Dict(_) => self.to_json().to_string(),
            Cell::Object { repr, .. } => repr.clone(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Cell::Null => JsonValue::Null,
            Cell::Bool(b) => JsonValue::Bool(*b),
            Cell::Int(i) => JsonValue::Number(Number::from(*i)),
            Cell::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Cell::Str(s) => JsonValue::String(s.clone()),
            Cell::Bytes(b) => {
                JsonValue::Array(b.iter().map(|byte| JsonValue::Number((*byte).into())).collect())
            }
            Cell::Datetime(micros) => JsonValue::String(format_datetime(*micros)),
            Cell::List(items) => JsonValue::Array(items.iter().map(Cell::to_json).collect()),
            Cell::Dict(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, JsonValue>>(),
            ),
            Cell::Object { repr, .. } => JsonValue::String(repr.clone()),
        }
    }

    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Cell::Null,
            JsonValue::Bool(b) => Cell::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Cell::Int(i)
                } else {
                    Cell::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Cell::Str(s.clone()),
            JsonValue::Array(items) => Cell::List(items.iter().map(Cell::from_json).collect()),
            JsonValue::Object(entries) => Cell::Dict(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Cell::from_json(v)))
                    .collect(),
            ),
        }
    }
}

fn format_datetime(micros: i64) -> String {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| micros.to_string())
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "null"),
            other => write!(f, "{}", other.display_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Str(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Str(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// Logical type inferred from the non-null cells of an object column.
///
/// The names follow the common dataframe vocabulary so they can be listed in
/// configuration (`ambiguous_column_types`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    Empty,
    Integer,
    Floating,
    MixedIntegerFloat,
    Boolean,
    String,
    Bytes,
    Datetime,
    MixedInteger,
    Mixed,
}

impl InferredType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferredType::Empty => "empty",
            InferredType::Integer => "integer",
            InferredType::Floating => "floating",
            InferredType::MixedIntegerFloat => "mixed-integer-float",
            InferredType::Boolean => "boolean",
            InferredType::String => "string",
            InferredType::Bytes => "bytes",
            InferredType::Datetime => "datetime",
            InferredType::MixedInteger => "mixed-integer",
            InferredType::Mixed => "mixed",
        }
    }

    /// Infer the logical type of a run of cells, ignoring nulls.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut ints = false;
        let mut floats = false;
        let mut bools = false;
        let mut strs = false;
        let mut bytes = false;
        let mut datetimes = false;
        let mut others = false;

        for cell in cells {
            match cell {
                Cell::Null => {}
                Cell::Int(_) => ints = true,
                Cell::Float(_) => floats = true,
                Cell::Bool(_) => bools = true,
                Cell::Str(_) => strs = true,
                Cell::Bytes(_) => bytes = true,
                Cell::Datetime(_) => datetimes = true,
                Cell::List(_) | Cell::Dict(_) | Cell::Object { .. } => others = true,
            }
        }

        let kinds = [ints, floats, bools, strs, bytes, datetimes, others]
            .iter()
            .filter(|k| **k)
            .count();

        match kinds {
            0 => InferredType::Empty,
            1 if ints => InferredType::Integer,
            1 if floats => InferredType::Floating,
            1 if bools => InferredType::Boolean,
            1 if strs => InferredType::String,
            1 if bytes => InferredType::Bytes,
            1 if datetimes => InferredType::Datetime,
            1 => InferredType::Mixed,
            2 if ints && floats => InferredType::MixedIntegerFloat,
            _ if ints => InferredType::MixedInteger,
            _ => InferredType::Mixed,
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_homogeneous() {
        let cells = vec![Cell::Int(1), Cell::Null, Cell::Int(3)];
        assert_eq!(InferredType::infer(&cells), InferredType::Integer);

        let cells = vec![Cell::from("a"), Cell::from("b")];
        assert_eq!(InferredType::infer(&cells), InferredType::String);
    }

    #[test]
    fn test_infer_mixed() {
        let cells = vec![Cell::from("x"), Cell::Int(2), Cell::from("z")];
        assert_eq!(InferredType::infer(&cells), InferredType::MixedInteger);

        let cells = vec![Cell::Int(1), Cell::Float(2.5)];
        assert_eq!(InferredType::infer(&cells), InferredType::MixedIntegerFloat);

        let cells = vec![Cell::Float(1.5), Cell::from("x")];
        assert_eq!(InferredType::infer(&cells), InferredType::Mixed);

        let cells = vec![Cell::List(vec![]), Cell::List(vec![Cell::Int(1)])];
        assert_eq!(InferredType::infer(&cells), InferredType::Mixed);
    }

    #[test]
    fn test_infer_empty() {
        assert_eq!(InferredType::infer(&[Cell::Null]), InferredType::Empty);
    }

    #[test]
    fn test_json_conversion_nested() {
        let mut dict = BTreeMap::new();
        dict.insert("k".to_string(), Cell::List(vec![Cell::Int(1), Cell::Float(2.5)]));
        let cell = Cell::Dict(dict);

        let json = cell.to_json();
        assert_eq!(json.to_string(), r#"{"k":[1,2.5]}"#);
        assert_eq!(Cell::from_json(&json), cell);
    }

    #[test]
    fn test_display_string() {
        assert_eq!(Cell::Int(2).display_string(), "2");
        assert_eq!(Cell::object("ObjectId", "64b7f0").display_string(), "64b7f0");
        assert_eq!(Cell::Datetime(0).display_string(), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_class_name_and_primitive() {
        assert_eq!(Cell::object("UUID", "x").class_name(), "UUID");
        assert!(Cell::Int(1).is_primitive());
        assert!(!Cell::List(vec![]).is_primitive());
        assert!(!Cell::object("UUID", "x").is_primitive());
    }
}
