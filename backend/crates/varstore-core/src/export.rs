//! CSV export of tabular variables.
//!
//! Columns the CSV writer cannot render (nested, binary, object) are written
//! as their display strings.

use crate::error::Result;
use arrow::array::{Array, ArrayRef, StringArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use std::io::Write;
use std::sync::Arc;
use varstore_commons::{Column, ColumnData, Frame};
use varstore_filestore::FilestoreError;

fn csv_native(data_type: &DataType) -> bool {
    data_type.is_primitive()
        || matches!(
            data_type,
            DataType::Boolean | DataType::Utf8 | DataType::LargeUtf8
        )
}

/// `frame` with every column in a form the CSV writer accepts.
pub fn csv_batch(frame: &Frame) -> Result<RecordBatch> {
    let columns = frame
        .columns()
        .iter()
        .map(|column| match &column.data {
            ColumnData::Native(array) if csv_native(array.data_type()) => Ok(column.clone()),
            data => {
                let text: StringArray = data
                    .to_cells()?
                    .iter()
                    .map(|cell| (!cell.is_null()).then(|| cell.display_string()))
                    .collect();
                Ok(Column::native(column.name.clone(), Arc::new(text) as ArrayRef))
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Frame::new(columns)?.to_record_batch()?)
}

/// Write `batch` as CSV with a header row.
pub fn write_csv(batch: &RecordBatch, out: &mut dyn Write) -> varstore_filestore::Result<()> {
    let mut writer = WriterBuilder::new().with_header(true).build(out);
    writer
        .write(batch)
        .map_err(|e| FilestoreError::Other(format!("CSV export failed: {}", e)))
}
