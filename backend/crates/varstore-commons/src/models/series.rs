use crate::errors::{CommonError, Result};
use crate::models::cell::Cell;
use crate::models::frame::ColumnData;
use serde_json::Value as JsonValue;

/// A single named column with its own row index.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub data: ColumnData,
    pub index: Vec<Cell>,
}

impl Series {
    /// Series with the default `0..len` index.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        let index = Self::default_index(data.len());
        Self {
            name: name.into(),
            data,
            index,
        }
    }

    pub fn with_index(name: impl Into<String>, data: ColumnData, index: Vec<Cell>) -> Result<Self> {
        if index.len() != data.len() {
            return Err(CommonError::LengthMismatch {
                column: "index".to_string(),
                expected: data.len(),
                actual: index.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            data,
            index,
        })
    }

    pub fn default_index(len: usize) -> Vec<Cell> {
        (0..len as i64).map(Cell::Int).collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn has_default_index(&self) -> bool {
        self.index
            .iter()
            .enumerate()
            .all(|(i, cell)| matches!(cell, Cell::Int(v) if *v == i as i64))
    }

    pub fn head(&self, n: usize) -> Series {
        let n = n.min(self.len());
        Series {
            name: self.name.clone(),
            data: self.data.slice(0, n),
            index: self.index[..n].to_vec(),
        }
    }

    pub fn values(&self) -> Result<Vec<Cell>> {
        self.data.to_cells()
    }

    /// Plain JSON list of the values, used when a series is stored generically.
    pub fn to_json(&self) -> Result<JsonValue> {
        Ok(JsonValue::Array(self.values()?.iter().map(Cell::to_json).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_index() {
        let series = Series::new("s", ColumnData::Object(vec![Cell::Int(5), Cell::Int(6)]));
        assert!(series.has_default_index());
        assert_eq!(series.index, vec![Cell::Int(0), Cell::Int(1)]);
    }

    #[test]
    fn test_custom_index() {
        let series = Series::with_index(
            "s",
            ColumnData::Object(vec![Cell::Int(5), Cell::Int(6)]),
            vec![Cell::from("a"), Cell::from("b")],
        )
        .unwrap();
        assert!(!series.has_default_index());
        assert_eq!(series.head(1).index, vec![Cell::from("a")]);
    }

    #[test]
    fn test_index_length_checked() {
        assert!(Series::with_index("s", ColumnData::Object(vec![Cell::Int(1)]), vec![]).is_err());
    }
}
