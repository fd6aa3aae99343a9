//! SPARSE_MATRIX: CSR matrices stored as JSON records.
//!
//! The sample record is the matrix bounded to the configured rows and columns.
//! Reads decode the record back into a matrix (or a list of them) and apply the
//! requested sample bound to the decoded matrix, never to the raw JSON.

use super::{generic, unsupported, VariantContext};
use crate::error::{Result, VariableError};
use crate::options::{FailurePolicy, ReadOptions};
use serde_json::Value as JsonValue;
use varstore_commons::constants::JSON_FILE;
use varstore_commons::{CsrMatrix, VariableType, VariableValue};

pub async fn write(
    ctx: VariantContext<'_>,
    value: &VariableValue,
    policy: FailurePolicy,
) -> Result<()> {
    let rows = ctx.settings.sample_count;
    let cols = ctx.settings.sample_max_columns;
    let (full, sample) = match value {
        VariableValue::SparseMatrix(matrix) => {
            matrix.validate()?;
            (to_json(matrix)?, to_json(&matrix.slice(rows, cols))?)
        }
        VariableValue::SparseMatrices(matrices) => {
            for matrix in matrices {
                matrix.validate()?;
            }
            let samples: Vec<CsrMatrix> = matrices.iter().map(|m| m.slice(rows, cols)).collect();
            (to_json(matrices)?, to_json(&samples)?)
        }
        other => return Err(unsupported(VariableType::SparseMatrix, other)),
    };
    generic::write_records(ctx, &full, &sample, policy).await
}

pub async fn read(ctx: VariantContext<'_>, options: &ReadOptions) -> Result<VariableValue> {
    let record = generic::read_record(ctx, options).await?;
    match decode(&record) {
        Ok(value) if options.sample => {
            let rows = ctx.sample_count(options);
            let cols = ctx.settings.sample_max_columns;
            Ok(match value {
                VariableValue::SparseMatrix(m) => VariableValue::SparseMatrix(m.slice(rows, cols)),
                VariableValue::SparseMatrices(ms) => VariableValue::SparseMatrices(
                    ms.iter().map(|m| m.slice(rows, cols)).collect(),
                ),
                other => other,
            })
        }
        Ok(value) => Ok(value),
        Err(e) if options.strict => Err(VariableError::CorruptRecord {
            path: ctx.file(JSON_FILE).display().to_string(),
            message: e.to_string(),
        }),
        Err(e) => {
            log::warn!(
                "Stored record at {} is not a sparse matrix: {}",
                ctx.paths.variable_path().display(),
                e
            );
            Ok(VariableValue::Json(record))
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsonValue> {
    serde_json::to_value(value).map_err(|e| VariableError::Codec(e.to_string()))
}

fn decode(record: &JsonValue) -> Result<VariableValue> {
    if record.is_array() {
        let matrices: Vec<CsrMatrix> = serde_json::from_value(record.clone())
            .map_err(|e| VariableError::Codec(e.to_string()))?;
        for matrix in &matrices {
            matrix.validate()?;
        }
        return Ok(VariableValue::SparseMatrices(matrices));
    }
    let matrix: CsrMatrix =
        serde_json::from_value(record.clone()).map_err(|e| VariableError::Codec(e.to_string()))?;
    matrix.validate()?;
    Ok(VariableValue::SparseMatrix(matrix))
}
