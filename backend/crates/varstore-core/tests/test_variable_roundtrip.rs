//! Round trips through the Variable facade, one variant at a time.

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use varstore_commons::{
    Cell, Column, ColumnData, CsrMatrix, Frame, GeoFrame, ModelArtifact, Series,
    VariableIdentity, VariableType, VariableValue,
};
use varstore_core::{ReadOptions, Variable};
use varstore_filestore::{ObjectStorage, Storage};

fn memory() -> Arc<dyn Storage> {
    Arc::new(ObjectStorage::in_memory())
}

fn identity(uuid: &str) -> VariableIdentity {
    VariableIdentity::new("/pipelines/etl", "transform", uuid)
}

async fn reopen(storage: &Arc<dyn Storage>, uuid: &str) -> Variable {
    Variable::builder(identity(uuid), Arc::clone(storage))
        .open()
        .await
        .unwrap()
}

fn mixed_table() -> Frame {
    Frame::new(vec![
        Column::native("id", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
        Column::native("score", Arc::new(Float64Array::from(vec![0.5, 1.5, 2.5])) as ArrayRef),
        Column::native("name", Arc::new(StringArray::from(vec!["a", "b", "c"])) as ArrayRef),
        Column::native(
            "active",
            Arc::new(BooleanArray::from(vec![true, false, true])) as ArrayRef,
        ),
        Column::object("mixed", vec![Cell::from("x"), Cell::Int(2), Cell::from("z")]),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_tabular_round_trip() {
    let storage = memory();
    let mut variable = reopen(&storage, "df").await;
    variable.write_data_async(&mixed_table().into()).await.unwrap();
    assert_eq!(variable.variable_type(), Some(VariableType::Tabular));

    let variable = reopen(&storage, "df").await;
    assert_eq!(variable.variable_type(), Some(VariableType::Tabular));
    let VariableValue::Frame(frame) = variable.read_data_async(&ReadOptions::default()).await.unwrap()
    else {
        panic!("expected a frame");
    };

    let original = mixed_table();
    for name in ["id", "score", "name", "active"] {
        assert_eq!(
            frame.column_cells(name).unwrap(),
            original.column_cells(name).unwrap(),
            "column {name}"
        );
    }
    assert_eq!(
        frame.column_cells("mixed").unwrap(),
        vec![Cell::from("x"), Cell::from("2"), Cell::from("z")]
    );
}

#[tokio::test]
async fn test_series_round_trip() {
    let storage = memory();
    let first = Series::with_index(
        "left",
        ColumnData::Native(Arc::new(Int64Array::from(vec![1, 2, 3]))),
        vec![Cell::from("a"), Cell::from("b"), Cell::from("c")],
    )
    .unwrap();
    let second = Series::new(
        "right",
        ColumnData::Native(Arc::new(Float64Array::from(vec![9.5]))),
    );

    let mut variable = Variable::builder(identity("pair"), Arc::clone(&storage))
        .variable_type(VariableType::Series)
        .open()
        .await
        .unwrap();
    variable
        .write_data_async(&VariableValue::SeriesList(vec![first.clone(), second.clone()]))
        .await
        .unwrap();

    let variable = reopen(&storage, "pair").await;
    assert_eq!(variable.variable_type(), Some(VariableType::Series));
    let VariableValue::SeriesList(list) =
        variable.read_data_async(&ReadOptions::default()).await.unwrap()
    else {
        panic!("expected a series list");
    };
    assert_eq!(list[0].name, "left");
    assert_eq!(list[0].index, first.index);
    assert_eq!(list[0].values().unwrap(), first.values().unwrap());
    assert_eq!(list[1].name, "right");
    assert_eq!(list[1].values().unwrap(), vec![Cell::Float(9.5)]);
    assert!(list[1].has_default_index());
}

#[tokio::test]
async fn test_series_under_generic_tag_is_a_list() {
    let storage = memory();
    let series = Series::new("s", ColumnData::Object(vec![Cell::Int(1), Cell::Int(2)]));
    let mut variable = Variable::builder(identity("plain"), Arc::clone(&storage))
        .variable_type(VariableType::Generic)
        .open()
        .await
        .unwrap();
    variable.write_data_async(&series.into()).await.unwrap();

    let value = reopen(&storage, "plain")
        .await
        .read_data_async(&ReadOptions::default())
        .await
        .unwrap();
    assert_eq!(value.as_json(), Some(&json!([1, 2])));
}

#[tokio::test]
async fn test_sparse_round_trip() {
    let storage = memory();
    let matrix = CsrMatrix::from_dense(&[vec![0.0, 1.0, 0.0], vec![2.0, 0.0, 3.0]]).unwrap();
    let mut variable = reopen(&storage, "features").await;
    variable.write_data_async(&matrix.clone().into()).await.unwrap();

    let value = reopen(&storage, "features")
        .await
        .read_data_async(&ReadOptions::default())
        .await
        .unwrap();
    assert!(matches!(value, VariableValue::SparseMatrix(m) if m == matrix));
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Centroids {
    k: usize,
    centers: Vec<Vec<f64>>,
}

#[tokio::test]
async fn test_model_round_trip() {
    let storage = memory();
    let model = Centroids {
        k: 2,
        centers: vec![vec![0.0, 0.0], vec![1.0, 1.0]],
    };
    let artifact = ModelArtifact::from_model("clustering", "Centroids", &model).unwrap();
    let mut variable = reopen(&storage, "model").await;
    variable.write_data_async(&artifact.into()).await.unwrap();

    let value = reopen(&storage, "model")
        .await
        .read_data_async(&ReadOptions::default())
        .await
        .unwrap();
    let VariableValue::Model(restored) = value else {
        panic!("expected a model");
    };
    assert_eq!(restored.into_model::<Centroids>().unwrap(), model);
}

#[tokio::test]
async fn test_nested_record_round_trip() {
    let storage = memory();
    let record = json!({"run": {"params": [1, 2, {"deep": true}], "name": "etl"}});
    let mut variable = reopen(&storage, "record").await;
    variable.write_data_async(&record.clone().into()).await.unwrap();

    let value = reopen(&storage, "record")
        .await
        .read_data_async(&ReadOptions::default())
        .await
        .unwrap();
    assert_eq!(value.as_json(), Some(&record));
}

#[tokio::test]
async fn test_geo_round_trip() {
    let storage = memory();
    let frame = Frame::new(vec![
        Column::object("city", vec![Cell::from("Oslo"), Cell::from("Lima")]),
        Column::object(
            "geometry",
            vec![Cell::from("POINT (10.7 59.9)"), Cell::from("POINT (-77 -12)")],
        ),
    ])
    .unwrap();
    let geo = GeoFrame::new(frame, "geometry").unwrap();

    let mut variable = reopen(&storage, "cities").await;
    variable.write_data_async(&geo.clone().into()).await.unwrap();

    let variable = reopen(&storage, "cities").await;
    assert_eq!(variable.variable_type(), Some(VariableType::Geospatial));
    let value = variable.read_data_async(&ReadOptions::default()).await.unwrap();
    let VariableValue::Geo(restored) = value else {
        panic!("expected a geo frame");
    };
    assert_eq!(restored.geometry_column, "geometry");
    assert_eq!(
        restored.frame.column_cells("city").unwrap(),
        geo.frame.column_cells("city").unwrap()
    );
}

#[tokio::test]
async fn test_alt_engine_round_trip() {
    let storage = memory();
    let batch = arrow::record_batch::RecordBatch::try_from_iter(vec![(
        "n",
        Arc::new(Int64Array::from(vec![4, 5])) as ArrayRef,
    )])
    .unwrap();
    let mut variable = reopen(&storage, "batch").await;
    variable.write_data_async(&batch.clone().into()).await.unwrap();
    assert_eq!(variable.variable_type(), Some(VariableType::TabularAltEngine));

    let value = reopen(&storage, "batch")
        .await
        .read_data_async(&ReadOptions::default())
        .await
        .unwrap();
    assert!(matches!(value, VariableValue::Batch(b) if b.columns() == batch.columns()));
}

#[tokio::test]
async fn test_frame_analysis() {
    let storage = memory();
    let mut variable = Variable::builder(identity("df"), Arc::clone(&storage))
        .variable_type(VariableType::FrameAnalysis)
        .open()
        .await
        .unwrap();
    variable
        .write_data_async(&json!({"statistics": {"rows": 3}, "suggestions": []}).into())
        .await
        .unwrap();
    assert!(!storage
        .path_exists(&variable.full_path(Some("type.json")))
        .await
        .unwrap());

    let value = variable
        .read_data_async(&ReadOptions::default().with_analysis_keys(["statistics"]))
        .await
        .unwrap();
    assert_eq!(value.as_json(), Some(&json!({"statistics": {"rows": 3}})));
}
