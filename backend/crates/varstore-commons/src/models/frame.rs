//! In-memory tabular values.
//!
//! A `Frame` is an ordered list of named columns. Each column is either an
//! Arrow array (a native, statically-typed column) or a vector of `Cell`s (an
//! object column whose elements may have any type). Object columns are what
//! the column type codec has to make safe before a frame can be written to
//! Parquet.

use crate::arrow_conversion::{array_to_cells, cells_to_array};
use crate::errors::{CommonError, Result};
use crate::models::cell::Cell;
use arrow::array::{Array, ArrayRef};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::collections::HashSet;
use std::sync::Arc;

/// Storage of a single column.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Native(ArrayRef),
    Object(Vec<Cell>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Native(array) => array.len(),
            ColumnData::Object(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ColumnData::Object(_))
    }

    pub fn slice(&self, offset: usize, length: usize) -> ColumnData {
        let offset = offset.min(self.len());
        let length = length.min(self.len() - offset);
        match self {
            ColumnData::Native(array) => ColumnData::Native(array.slice(offset, length)),
            ColumnData::Object(cells) => {
                ColumnData::Object(cells[offset..offset + length].to_vec())
            }
        }
    }

    /// Row values as cells, whatever the storage.
    pub fn to_cells(&self) -> Result<Vec<Cell>> {
        match self {
            ColumnData::Native(array) => array_to_cells(array.as_ref()),
            ColumnData::Object(cells) => Ok(cells.clone()),
        }
    }

    /// Arrow form of the column; object columns must be homogeneous.
    pub fn to_array(&self) -> Result<ArrayRef> {
        match self {
            ColumnData::Native(array) => Ok(Arc::clone(array)),
            ColumnData::Object(cells) => cells_to_array(cells),
        }
    }
}

impl PartialEq for ColumnData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ColumnData::Native(a), ColumnData::Native(b)) => a.to_data() == b.to_data(),
            (ColumnData::Object(a), ColumnData::Object(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn native(name: impl Into<String>, array: ArrayRef) -> Self {
        Self::new(name, ColumnData::Native(array))
    }

    pub fn object(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self::new(name, ColumnData::Object(cells))
    }
}

/// Ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Frame {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(CommonError::DuplicateColumn(column.name.clone()));
            }
        }

        let num_rows = columns.first().map_or(0, |c| c.data.len());
        if let Some(column) = columns.iter().find(|c| c.data.len() != num_rows) {
            return Err(CommonError::LengthMismatch {
                column: column.name.clone(),
                expected: num_rows,
                actual: column.data.len(),
            });
        }

        Ok(Self { columns, num_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Cells of the named column.
    pub fn column_cells(&self, name: &str) -> Result<Vec<Cell>> {
        self.column(name)
            .ok_or_else(|| CommonError::ColumnNotFound(name.to_string()))?
            .data
            .to_cells()
    }

    pub fn has_object_columns(&self) -> bool {
        self.columns.iter().any(|c| c.data.is_object())
    }

    pub fn slice(&self, offset: usize, length: usize) -> Frame {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.data.slice(offset, length)))
            .collect();
        let num_rows = columns.first().map_or(0, |c| c.data.len());
        Frame { columns, num_rows }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Frame {
        self.slice(0, n)
    }

    /// First `n` columns.
    pub fn select_first(&self, n: usize) -> Frame {
        let columns: Vec<Column> = self.columns.iter().take(n).cloned().collect();
        let num_rows = if columns.is_empty() { 0 } else { self.num_rows };
        Frame { columns, num_rows }
    }

    /// Arrow form of the frame; fails when an object column is not representable.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let array = column.data.to_array()?;
            fields.push(Field::new(&column.name, array.data_type().clone(), true));
            arrays.push(array);
        }
        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            arrays,
            &options,
        )?)
    }

    /// Every column of the batch becomes a native column.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Frame> {
        let columns = batch
            .schema()
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, array)| Column::native(field.name().clone(), Arc::clone(array)))
            .collect();
        Frame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;

    fn sample_frame() -> Frame {
        Frame::new(vec![
            Column::native("a", Arc::new(Int64Array::from(vec![1, 2, 3]))),
            Column::object("b", vec![Cell::from("x"), Cell::Int(2), Cell::from("z")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Frame::new(vec![
            Column::object("a", vec![Cell::Int(1)]),
            Column::object("a", vec![Cell::Int(2)]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Please do not use duplicate column name"));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = Frame::new(vec![
            Column::object("a", vec![Cell::Int(1)]),
            Column::object("b", vec![Cell::Int(1), Cell::Int(2)]),
        ])
        .unwrap_err();
        assert!(matches!(err, CommonError::LengthMismatch { .. }));
    }

    #[test]
    fn test_head_and_select_first() {
        let frame = sample_frame();
        let sample = frame.head(2).select_first(1);
        assert_eq!(sample.num_rows(), 2);
        assert_eq!(sample.column_names(), vec!["a"]);
        assert_eq!(frame.head(10).num_rows(), 3);
    }

    #[test]
    fn test_mixed_object_column_not_representable() {
        assert!(sample_frame().to_record_batch().is_err());
    }

    #[test]
    fn test_record_batch_round_trip() {
        let frame = Frame::new(vec![
            Column::native("a", Arc::new(Int64Array::from(vec![1, 2]))),
            Column::object("s", vec![Cell::from("x"), Cell::Null]),
        ])
        .unwrap();
        let batch = frame.to_record_batch().unwrap();
        let back = Frame::from_record_batch(&batch).unwrap();
        assert_eq!(back.column_cells("s").unwrap(), vec![Cell::from("x"), Cell::Null]);
        assert_eq!(back.column_cells("a").unwrap(), vec![Cell::Int(1), Cell::Int(2)]);
    }
}
