//! Sampling, metadata authority, legacy layout, delete and the blocking API.

use arrow::array::{ArrayRef, Int64Array};
use bytes::Bytes;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use varstore_commons::constants::{
    COLUMN_TYPES_FILE, CSV_FILE, JSON_FILE, PARQUET_FILE, PARQUET_SAMPLE_FILE,
};
use varstore_commons::{Cell, Column, Frame, VariableIdentity, VariableType, VariableValue};
use varstore_configs::VariableSettings;
use varstore_core::{DistributedContext, ReadOptions, Variable, VariableError};
use varstore_filestore::{read_parquet, write_parquet, ObjectStorage, Storage};

fn memory() -> Arc<dyn Storage> {
    Arc::new(ObjectStorage::in_memory())
}

fn identity(uuid: &str) -> VariableIdentity {
    VariableIdentity::new("/pipelines/etl", "transform", uuid)
}

fn settings(sample_count: usize, sample_max_columns: usize) -> VariableSettings {
    VariableSettings {
        sample_count,
        sample_max_columns,
        ..Default::default()
    }
}

fn wide_frame(rows: usize, columns: usize) -> Frame {
    Frame::new(
        (0..columns)
            .map(|c| {
                let values: Vec<i64> = (0..rows as i64).map(|r| r * 100 + c as i64).collect();
                Column::native(format!("c{c}"), Arc::new(Int64Array::from(values)) as ArrayRef)
            })
            .collect(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_mixed_column_scenario() {
    let storage = memory();
    let mut variable = Variable::builder(identity("scenario"), Arc::clone(&storage))
        .settings(settings(2, 2))
        .open()
        .await
        .unwrap();
    let frame = Frame::new(vec![
        Column::native("a", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
        Column::object("b", vec![Cell::from("x"), Cell::Int(2), Cell::from("z")]),
    ])
    .unwrap();
    variable.write_data_async(&frame.into()).await.unwrap();

    let types = storage
        .read_bytes(&variable.full_path(Some(COLUMN_TYPES_FILE)))
        .await
        .unwrap();
    let types: serde_json::Value = serde_json::from_slice(&types).unwrap();
    assert_eq!(types["b"], "str");

    let sample = read_parquet(storage.as_ref(), &variable.full_path(Some(PARQUET_SAMPLE_FILE)))
        .await
        .unwrap();
    assert_eq!(sample.batch.num_rows(), 2);
    let names: Vec<String> = sample
        .batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(names, vec!["a", "b"]);

    let VariableValue::Frame(full) = variable.read_data_async(&ReadOptions::default()).await.unwrap()
    else {
        panic!("expected a frame");
    };
    assert_eq!(
        full.column_cells("b").unwrap(),
        vec![Cell::from("x"), Cell::from("2"), Cell::from("z")]
    );
    assert_eq!(
        full.column_cells("a").unwrap(),
        vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]
    );
}

#[tokio::test]
async fn test_sample_bound_on_wide_table() {
    let storage = memory();
    let mut variable = Variable::builder(identity("wide"), Arc::clone(&storage))
        .settings(settings(1000, 30))
        .open()
        .await
        .unwrap();
    variable
        .write_data_async(&wide_frame(10_000, 50).into())
        .await
        .unwrap();

    let full = read_parquet(storage.as_ref(), &variable.full_path(Some(PARQUET_FILE)))
        .await
        .unwrap();
    let sample = read_parquet(storage.as_ref(), &variable.full_path(Some(PARQUET_SAMPLE_FILE)))
        .await
        .unwrap();
    assert_eq!(sample.batch.num_rows(), 1000);
    assert_eq!(sample.batch.num_columns(), 30);

    let expected = full
        .batch
        .slice(0, 1000)
        .project(&(0..30).collect::<Vec<_>>())
        .unwrap();
    assert_eq!(sample.batch, expected);

    let preview = variable.read_data_async(&ReadOptions::sampled()).await.unwrap();
    let frame = preview.as_frame().unwrap();
    assert_eq!(frame.num_rows(), 1000);
    assert_eq!(frame.num_columns(), 30);

    let smaller = variable
        .read_data_async(&ReadOptions::default().with_sample_count(10))
        .await
        .unwrap();
    assert_eq!(smaller.as_frame().unwrap().num_rows(), 10);
}

#[tokio::test]
async fn test_metadata_is_authoritative() {
    let storage = memory();
    let mut variable = Variable::builder(identity("record"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    variable.write_data_async(&json!({"k": 1}).into()).await.unwrap();

    // Columnar evidence that would otherwise classify the variable as tabular
    let batch = wide_frame(2, 1).to_record_batch().unwrap();
    write_parquet(storage.as_ref(), &variable.full_path(Some(PARQUET_FILE)), &batch, &[])
        .await
        .unwrap();

    let variable = Variable::builder(identity("record"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    assert_eq!(variable.variable_type(), Some(VariableType::Generic));
    let value = variable.read_data_async(&ReadOptions::default()).await.unwrap();
    assert_eq!(value.as_json(), Some(&json!({"k": 1})));
}

#[tokio::test]
async fn test_corrupt_metadata_falls_back_to_evidence() {
    let storage = memory();
    let mut variable = Variable::builder(identity("df"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    variable.write_data_async(&wide_frame(3, 2).into()).await.unwrap();
    storage
        .write_bytes(&variable.full_path(Some("type.json")), Bytes::from_static(b"{oops"))
        .await
        .unwrap();

    let variable = Variable::builder(identity("df"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    assert_eq!(variable.variable_type(), Some(VariableType::Tabular));
}

#[tokio::test]
async fn test_legacy_record_is_readable() {
    let storage = memory();
    let value = json!({"rows": [[1, "a"], [2, "b"]]});

    let mut canonical = Variable::builder(identity("canonical"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    canonical.write_data_async(&value.clone().into()).await.unwrap();

    let legacy = Variable::builder(identity("legacy"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    storage
        .write_bytes(
            legacy.paths().legacy_record(),
            Bytes::from(serde_json::to_vec(&value).unwrap()),
        )
        .await
        .unwrap();

    let from_legacy = legacy.read_data_async(&ReadOptions::default()).await.unwrap();
    let from_canonical = canonical.read_data_async(&ReadOptions::default()).await.unwrap();
    assert_eq!(from_legacy.as_json(), from_canonical.as_json());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let storage = memory();
    let mut variable = Variable::builder(identity("gone"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    variable.write_data_async(&wide_frame(5, 2).into()).await.unwrap();
    storage
        .write_bytes(variable.paths().legacy_record(), Bytes::from_static(b"[]"))
        .await
        .unwrap();

    variable.delete_async().await.unwrap();
    variable.delete_async().await.unwrap();
    assert!(!storage.path_exists(variable.variable_path()).await.unwrap());
    assert!(!storage
        .path_exists(variable.paths().legacy_record())
        .await
        .unwrap());
}

#[test]
fn test_blocking_api_on_local_disk() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(ObjectStorage::local(dir.path()).unwrap());
    let identity = VariableIdentity::new(dir.path().join("etl"), "Load Data", "out");

    let mut variable = Variable::builder(identity.clone(), Arc::clone(&storage))
        .open_sync()
        .unwrap();
    assert!(dir.path().join("etl/.variables/load_data").is_dir());

    variable.write_data(&wide_frame(4, 3).into()).unwrap();
    assert!(dir.path().join("etl/.variables/load_data/out/data.parquet").is_file());
    assert!(dir.path().join("etl/.variables/load_data/out/type.json").is_file());

    let reopened = Variable::builder(identity, Arc::clone(&storage))
        .open_sync()
        .unwrap();
    let value = reopened.read_data(&ReadOptions::default()).unwrap();
    assert_eq!(value.as_frame().unwrap().num_rows(), 4);

    reopened.convert_to_csv().unwrap();
    let csv = std::fs::read_to_string(reopened.full_path(Some(CSV_FILE))).unwrap();
    assert!(csv.starts_with("c0,c1,c2\n"));
    reopened.convert_to_csv().unwrap();

    reopened.delete().unwrap();
    assert!(!reopened.variable_path().exists());
    reopened.delete().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blocking_and_async_writes_match() {
    let storage = memory();
    let frame = wide_frame(20, 4);

    let mut blocking = Variable::builder(identity("blocking"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    let value = VariableValue::from(frame.clone());
    tokio::task::block_in_place(|| blocking.write_data(&value)).unwrap();

    let mut suspending = Variable::builder(identity("suspending"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    suspending.write_data_async(&value).await.unwrap();

    for file in [PARQUET_FILE, PARQUET_SAMPLE_FILE, COLUMN_TYPES_FILE, "type.json"] {
        let left = storage.read_bytes(&blocking.full_path(Some(file))).await.unwrap();
        let right = storage.read_bytes(&suspending.full_path(Some(file))).await.unwrap();
        assert_eq!(left, right, "{file}");
    }
}

#[tokio::test]
async fn test_open_to_write() {
    let storage = memory();
    let variable = Variable::builder(identity("notes"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    let written = variable
        .open_to_write_async("notes.txt", |out| {
            out.write_all(b"hello").map_err(|e| varstore_filestore::FilestoreError::Io(e.to_string()))
        })
        .await
        .unwrap();
    assert_eq!(written, 5);
    assert_eq!(
        storage
            .read_bytes(&variable.full_path(Some("notes.txt")))
            .await
            .unwrap(),
        Bytes::from_static(b"hello")
    );
}

#[tokio::test]
async fn test_invalid_identity_rejected() {
    let err = Variable::builder(identity("../escape"), memory())
        .open()
        .await
        .unwrap_err();
    assert!(matches!(err, varstore_core::VariableError::InvalidIdentity(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_distributed_directory_is_classified_with_engine() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(ObjectStorage::local(dir.path()).unwrap());
    let identity = VariableIdentity::new(dir.path().join("etl"), "spark", "events");
    let engine = DistributedContext::new();

    let df = engine
        .session()
        .read_batch(wide_frame(50, 2).to_record_batch().unwrap())
        .unwrap();
    let mut variable = Variable::builder(identity.clone(), Arc::clone(&storage))
        .engine(engine.clone())
        .open()
        .await
        .unwrap();
    variable.write_data_async(&VariableValue::Distributed(df)).await.unwrap();
    assert!(!variable.full_path(Some("type.json")).exists());

    let without_engine = Variable::builder(identity.clone(), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    assert_eq!(without_engine.variable_type(), None);

    let with_engine = Variable::builder(identity, Arc::clone(&storage))
        .engine(engine)
        .open()
        .await
        .unwrap();
    assert_eq!(with_engine.variable_type(), Some(VariableType::Distributed));
    let VariableValue::Distributed(df) = with_engine
        .read_data_async(&ReadOptions::default().with_sample_count(7))
        .await
        .unwrap()
    else {
        panic!("expected a distributed dataframe");
    };
    assert_eq!(df.count().await.unwrap(), 7);
}

#[tokio::test]
async fn test_tag_survives_mismatched_write() {
    let storage = memory();
    let mut variable = Variable::builder(identity("typed"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    variable.write_data_async(&wide_frame(3, 2).into()).await.unwrap();
    assert_eq!(variable.variable_type(), Some(VariableType::Tabular));

    let result = variable.write_data_async(&json!([1, 2]).into()).await;
    assert!(matches!(result, Err(VariableError::Unsupported { .. })), "{result:?}");
    assert_eq!(variable.variable_type(), Some(VariableType::Tabular));
    assert!(!storage
        .path_exists(&variable.full_path(Some(JSON_FILE)))
        .await
        .unwrap());

    let reopened = Variable::builder(identity("typed"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    assert_eq!(reopened.variable_type(), Some(VariableType::Tabular));
    let value = reopened.read_data_async(&ReadOptions::default()).await.unwrap();
    assert_eq!(value.as_frame().map(Frame::num_rows), Some(3));
}

#[tokio::test]
async fn test_reset_variable_type_allows_rewrite() {
    let storage = memory();
    let mut variable = Variable::builder(identity("retyped"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    variable.write_data_async(&wide_frame(2, 1).into()).await.unwrap();

    variable.reset_variable_type(Some(VariableType::Generic));
    variable.write_data_async(&json!({"k": 1}).into()).await.unwrap();

    let reopened = Variable::builder(identity("retyped"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    assert_eq!(reopened.variable_type(), Some(VariableType::Generic));
    let value = reopened.read_data_async(&ReadOptions::default()).await.unwrap();
    assert_eq!(value.as_json(), Some(&json!({"k": 1})));
}

#[tokio::test]
async fn test_series_tag_keeps_other_values_as_records() {
    let storage = memory();
    let mut variable = Variable::builder(identity("labels"), Arc::clone(&storage))
        .variable_type(VariableType::Series)
        .open()
        .await
        .unwrap();
    variable.write_data_async(&json!(["a", "b"]).into()).await.unwrap();
    assert_eq!(variable.variable_type(), Some(VariableType::Series));

    let reopened = Variable::builder(identity("labels"), Arc::clone(&storage))
        .open()
        .await
        .unwrap();
    assert_eq!(reopened.variable_type(), Some(VariableType::Series));
    let value = reopened.read_data_async(&ReadOptions::default()).await.unwrap();
    assert_eq!(value.as_json(), Some(&json!(["a", "b"])));
}
