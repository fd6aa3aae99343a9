use crate::errors::{CommonError, Result};
use crate::models::cell::Cell;
use crate::models::frame::Frame;
use crate::models::geo::GeoFrame;
use crate::models::model_artifact::ModelArtifact;
use crate::models::series::Series;
use crate::models::sparse::CsrMatrix;
use arrow::record_batch::RecordBatch;
use datafusion::dataframe::DataFrame;
use serde_json::{Map, Value as JsonValue};

/// Everything a variable can hold.
#[derive(Debug, Clone)]
pub enum VariableValue {
    Frame(Frame),
    /// Alternate-engine table: a plain Arrow batch.
    Batch(RecordBatch),
    /// Lazy DataFusion dataframe.
    Distributed(DataFrame),
    Geo(GeoFrame),
    SparseMatrix(CsrMatrix),
    SparseMatrices(Vec<CsrMatrix>),
    Series(Series),
    SeriesList(Vec<Series>),
    Model(ModelArtifact),
    Json(JsonValue),
}

impl VariableValue {
    /// Short shape name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            VariableValue::Frame(_) => "frame",
            VariableValue::Batch(_) => "record_batch",
            VariableValue::Distributed(_) => "distributed_dataframe",
            VariableValue::Geo(_) => "geo_frame",
            VariableValue::SparseMatrix(_) => "sparse_matrix",
            VariableValue::SparseMatrices(_) => "sparse_matrices",
            VariableValue::Series(_) => "series",
            VariableValue::SeriesList(_) => "series_list",
            VariableValue::Model(_) => "model",
            VariableValue::Json(_) => "json",
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            VariableValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            VariableValue::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    /// Record form used when a value is stored generically.
    ///
    /// Tables become `{column: [values..]}` objects and series become plain lists.
    pub fn to_json(&self) -> Result<JsonValue> {
        match self {
            VariableValue::Json(value) => Ok(value.clone()),
            VariableValue::Frame(frame) => frame_to_json(frame),
            VariableValue::Batch(batch) => frame_to_json(&Frame::from_record_batch(batch)?),
            VariableValue::Geo(geo) => frame_to_json(&geo.frame),
            VariableValue::Series(series) => series.to_json(),
            VariableValue::SeriesList(list) => Ok(JsonValue::Array(
                list.iter().map(Series::to_json).collect::<Result<Vec<_>>>()?,
            )),
            VariableValue::SparseMatrix(matrix) => serde_json::to_value(matrix)
                .map_err(|e| CommonError::Serialization(e.to_string())),
            VariableValue::SparseMatrices(matrices) => serde_json::to_value(matrices)
                .map_err(|e| CommonError::Serialization(e.to_string())),
            VariableValue::Model(model) => serde_json::to_value(model.origin())
                .map_err(|e| CommonError::Serialization(e.to_string())),
            VariableValue::Distributed(_) => Err(CommonError::Unsupported(
                "distributed dataframes cannot be stored as records".to_string(),
            )),
        }
    }
}

fn frame_to_json(frame: &Frame) -> Result<JsonValue> {
    let mut object = Map::with_capacity(frame.num_columns());
    for column in frame.columns() {
        let cells = column.data.to_cells()?;
        object.insert(
            column.name.clone(),
            JsonValue::Array(cells.iter().map(Cell::to_json).collect()),
        );
    }
    Ok(JsonValue::Object(object))
}

impl From<Frame> for VariableValue {
    fn from(frame: Frame) -> Self {
        VariableValue::Frame(frame)
    }
}

impl From<RecordBatch> for VariableValue {
    fn from(batch: RecordBatch) -> Self {
        VariableValue::Batch(batch)
    }
}

impl From<Series> for VariableValue {
    fn from(series: Series) -> Self {
        VariableValue::Series(series)
    }
}

impl From<CsrMatrix> for VariableValue {
    fn from(matrix: CsrMatrix) -> Self {
        VariableValue::SparseMatrix(matrix)
    }
}

impl From<ModelArtifact> for VariableValue {
    fn from(model: ModelArtifact) -> Self {
        VariableValue::Model(model)
    }
}

impl From<GeoFrame> for VariableValue {
    fn from(geo: GeoFrame) -> Self {
        VariableValue::Geo(geo)
    }
}

impl From<JsonValue> for VariableValue {
    fn from(value: JsonValue) -> Self {
        VariableValue::Json(value)
    }
}
