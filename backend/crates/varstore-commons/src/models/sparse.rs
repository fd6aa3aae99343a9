use crate::errors::{CommonError, Result};
use serde::{Deserialize, Serialize};

/// Compressed sparse row matrix of `f64` values.
///
/// Serialises to the record `{"data": [..], "indices": [..], "indptr": [..], "shape": [rows, cols]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    pub data: Vec<f64>,
    pub indices: Vec<usize>,
    pub indptr: Vec<usize>,
    pub shape: (usize, usize),
}

impl CsrMatrix {
    pub fn new(
        data: Vec<f64>,
        indices: Vec<usize>,
        indptr: Vec<usize>,
        shape: (usize, usize),
    ) -> Result<Self> {
        let matrix = Self {
            data,
            indices,
            indptr,
            shape,
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Compress a dense row-major matrix, dropping zeros.
    pub fn from_dense(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::new();
        let mut indices = Vec::new();
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        indptr.push(0);
        for row in rows {
            if row.len() != cols {
                return Err(CommonError::InvalidMatrix(format!(
                    "ragged row of length {} (expected {})",
                    row.len(),
                    cols
                )));
            }
            for (col, value) in row.iter().enumerate() {
                if *value != 0.0 {
                    data.push(*value);
                    indices.push(col);
                }
            }
            indptr.push(data.len());
        }
        Self::new(data, indices, indptr, (rows.len(), cols))
    }

    pub fn validate(&self) -> Result<()> {
        let (rows, cols) = self.shape;
        if self.indptr.len() != rows + 1 {
            return Err(CommonError::InvalidMatrix(format!(
                "indptr has {} entries for {} rows",
                self.indptr.len(),
                rows
            )));
        }
        if self.data.len() != self.indices.len() {
            return Err(CommonError::InvalidMatrix(
                "data and indices lengths differ".to_string(),
            ));
        }
        if self.indptr.windows(2).any(|w| w[0] > w[1])
            || self.indptr.last().copied() != Some(self.data.len())
        {
            return Err(CommonError::InvalidMatrix("indptr is not monotonic".to_string()));
        }
        if let Some(col) = self.indices.iter().find(|c| **c >= cols) {
            return Err(CommonError::InvalidMatrix(format!(
                "column index {} out of bounds for {} columns",
                col, cols
            )));
        }
        Ok(())
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.shape.0 {
            return 0.0;
        }
        let range = self.indptr[row]..self.indptr[row + 1];
        self.indices[range.clone()]
            .iter()
            .position(|c| *c == col)
            .map_or(0.0, |pos| self.data[range.start + pos])
    }

    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        (0..self.shape.0)
            .map(|row| (0..self.shape.1).map(|col| self.get(row, col)).collect())
            .collect()
    }

    /// Top-left `rows x cols` block.
    pub fn slice(&self, rows: usize, cols: usize) -> CsrMatrix {
        let rows = rows.min(self.shape.0);
        let cols = cols.min(self.shape.1);
        let mut data = Vec::new();
        let mut indices = Vec::new();
        let mut indptr = Vec::with_capacity(rows + 1);
        indptr.push(0);
        for row in 0..rows {
            for pos in self.indptr[row]..self.indptr[row + 1] {
                if self.indices[pos] < cols {
                    data.push(self.data[pos]);
                    indices.push(self.indices[pos]);
                }
            }
            indptr.push(data.len());
        }
        CsrMatrix {
            data,
            indices,
            indptr,
            shape: (rows, cols),
        }
    }
}
