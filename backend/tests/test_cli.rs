//! Runs the `varstore` binary against a variable written on local disk.

use arrow::array::{ArrayRef, Int64Array};
use serde_json::{json, Value as JsonValue};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use varstore_commons::{Cell, Column, ColumnData, Frame, VariableIdentity, VariableValue};
use varstore_core::Variable;
use varstore_filestore::ObjectStorage;

fn write_table(root: &Path) {
    let storage = Arc::new(ObjectStorage::local(root).unwrap());
    let identity = VariableIdentity::new("pipelines/etl", "load_data", "output_0");
    let mut variable = Variable::builder(identity, storage).open_sync().unwrap();

    let frame = Frame::new(vec![
        Column::native("a", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
        Column::new(
            "b",
            ColumnData::Object(vec![Cell::from("x"), Cell::from("y"), Cell::from("z")]),
        ),
    ])
    .unwrap();
    variable.write_data(&VariableValue::Frame(frame)).unwrap();
}

fn varstore(root: &Path, args: &[&str]) -> JsonValue {
    let output = Command::new(env!("CARGO_BIN_EXE_varstore"))
        .current_dir(root)
        .env("VARSTORE_BASE_DIR", root)
        .env("VARSTORE_STORAGE_BACKEND", "local")
        .env("VARSTORE_LOG_TO_CONSOLE", "false")
        .args(["-p", "pipelines/etl", "-b", "load_data", "-u", "output_0"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "varstore {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_classify_read_export_delete() {
    let dir = tempfile::tempdir().unwrap();
    write_table(dir.path());

    assert_eq!(varstore(dir.path(), &["classify"])["type"], "tabular");

    let shown = varstore(dir.path(), &["show"]);
    let files: Vec<&str> = shown["files"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(JsonValue::as_str)
        .collect();
    assert!(files.contains(&"data.parquet"));
    assert!(files.contains(&"type.json"));

    let read = varstore(dir.path(), &["read"]);
    assert_eq!(read["kind"], "frame");
    assert_eq!(read["data"], json!({"a": [1, 2, 3], "b": ["x", "y", "z"]}));

    let sample = varstore(dir.path(), &["read", "-n", "2"]);
    assert_eq!(sample["data"], json!({"a": [1, 2], "b": ["x", "y"]}));

    assert_eq!(varstore(dir.path(), &["export-csv"])["exported"], true);
    assert!(dir
        .path()
        .join("pipelines/etl/.variables/load_data/output_0/data.csv")
        .is_file());

    varstore(dir.path(), &["delete"]);
    assert!(!dir
        .path()
        .join("pipelines/etl/.variables/load_data/output_0")
        .exists());
}

#[test]
fn test_unknown_variable_reads_empty_record() {
    let dir = tempfile::tempdir().unwrap();
    let read = varstore(dir.path(), &["read"]);
    assert_eq!(read["kind"], "json");
    assert_eq!(read["data"], json!({}));
}
