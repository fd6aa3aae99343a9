//! Subcommand handlers.
//!
//! Every handler prints a single JSON document on stdout.

use crate::args::Command;
use arrow::compute::concat_batches;
use serde_json::{json, Value as JsonValue};
use varstore_commons::VariableValue;
use varstore_core::{ReadOptions, Variable};

pub async fn run(command: &Command, variable: &Variable) -> anyhow::Result<JsonValue> {
    match command {
        Command::Show => show(variable).await,
        Command::Classify => Ok(json!({ "type": type_name(variable) })),
        Command::Read {
            sample,
            rows,
            strict,
            keys,
        } => {
            let options = read_options(*sample, *rows, *strict, keys.clone());
            let value = variable.read_data_async(&options).await?;
            render_value(value).await
        }
        Command::ExportCsv => {
            variable.convert_to_csv_async().await?;
            let path = variable.full_path(Some(varstore_commons::constants::CSV_FILE));
            Ok(json!({
                "exported": variable.storage().path_exists(&path).await?,
                "path": path.display().to_string(),
            }))
        }
        Command::Delete => {
            variable.delete_async().await?;
            log::info!("Deleted variable {}", variable.identity());
            Ok(json!({ "deleted": variable.identity().to_string() }))
        }
    }
}

fn type_name(variable: &Variable) -> JsonValue {
    variable
        .variable_type()
        .map_or(JsonValue::Null, |t| JsonValue::String(t.as_str().to_string()))
}

async fn show(variable: &Variable) -> anyhow::Result<JsonValue> {
    let files = variable
        .storage()
        .listdir(variable.variable_path(), None)
        .await?;
    Ok(json!({
        "identity": variable.identity().to_string(),
        "type": type_name(variable),
        "storage": variable.storage().describe(),
        "variable_dir": variable.variable_dir_path().display().to_string(),
        "variable_path": variable.variable_path().display().to_string(),
        "files": files,
    }))
}

pub fn read_options(
    sample: bool,
    rows: Option<usize>,
    strict: bool,
    keys: Option<Vec<String>>,
) -> ReadOptions {
    let mut options = if sample || rows.is_some() {
        ReadOptions::sampled()
    } else {
        ReadOptions::default()
    };
    if let Some(rows) = rows {
        options = options.with_sample_count(rows);
    }
    if strict {
        options = options.strict();
    }
    if let Some(keys) = keys {
        options = options.with_analysis_keys(keys);
    }
    options
}

/// JSON form of a value read back from storage.
///
/// Distributed values are executed and collected first.
pub async fn render_value(value: VariableValue) -> anyhow::Result<JsonValue> {
    let kind = value.kind();
    let data = match value {
        VariableValue::Distributed(df) => {
            let schema = df.schema().inner().clone();
            let batches = df.collect().await?;
            let batch = concat_batches(&schema, &batches)?;
            VariableValue::Batch(batch).to_json()?
        }
        other => other.to_json()?,
    };
    Ok(json!({ "kind": kind, "data": data }))
}
