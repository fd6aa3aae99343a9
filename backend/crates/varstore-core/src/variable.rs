//! Variable facade.
//!
//! A [`Variable`] owns the canonical layout of one persisted variable and
//! dispatches reads, writes and deletes to the serializer of its variant.
//! Every operation has an async form and a blocking form driving the same
//! future, so both produce identical files.
//!
//! ```rust,ignore
//! let storage = build_storage(&config.storage)?;
//! let identity = VariableIdentity::new("/pipelines/etl", "load_data", "output_0");
//! let mut variable = Variable::builder(identity, storage)
//!     .settings(config.variables.clone())
//!     .open()
//!     .await?;
//! variable.write_data_async(&frame.into()).await?;
//! let preview = variable.read_data_async(&ReadOptions::sampled()).await?;
//! ```

use crate::classifier::{classify, classify_value, probe};
use crate::engine::DistributedContext;
use crate::error::{Result, VariableError};
use crate::export::{csv_batch, write_csv};
use crate::options::{FailurePolicy, ReadOptions};
use crate::paths::VariablePaths;
use crate::variants::{
    alt_engine, analysis, distributed, generic, geospatial, model, series, sparse, tabular,
    unsupported, VariantContext,
};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use varstore_commons::constants::{
    COLUMN_TYPES_FILE, CSV_FILE, DEFAULT_VARIABLES_DIR, PARQUET_FILE, PARQUET_SAMPLE_FILE,
};
use varstore_commons::{Frame, VariableIdentity, VariableType, VariableValue};
use varstore_configs::VariableSettings;
use varstore_filestore::{open_to_write, run_blocking, write_json_file, Storage};

/// Options for opening a [`Variable`].
#[derive(Debug)]
pub struct VariableBuilder {
    identity: VariableIdentity,
    storage: Arc<dyn Storage>,
    settings: VariableSettings,
    variable_type: Option<VariableType>,
    engine: Option<DistributedContext>,
}

impl VariableBuilder {
    pub fn settings(mut self, settings: VariableSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Explicit tag; skips classification from disk.
    pub fn variable_type(mut self, variable_type: VariableType) -> Self {
        self.variable_type = Some(variable_type);
        self
    }

    /// Engine context for distributed variables.
    pub fn engine(mut self, engine: DistributedContext) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Validate the identity, create the block directory and resolve the tag.
    pub async fn open(self) -> Result<Variable> {
        self.identity
            .block_uuid
            .validate()
            .map_err(|e| VariableError::InvalidIdentity(e.to_string()))?;
        self.identity
            .uuid
            .validate()
            .map_err(|e| VariableError::InvalidIdentity(e.to_string()))?;

        let paths = VariablePaths::new(&self.identity, &self.settings);
        self.storage.makedirs(paths.variable_dir(), true).await?;

        let variable_type = match self.variable_type {
            Some(variable_type) => Some(variable_type),
            None => {
                let evidence =
                    probe(self.storage.as_ref(), &paths, self.engine.is_some()).await?;
                classify(&evidence)
            }
        };
        log::debug!(
            "Opened variable {} as {}",
            self.identity,
            variable_type.map_or("untyped", |t| t.as_str())
        );

        Ok(Variable {
            identity: self.identity,
            storage: self.storage,
            settings: self.settings,
            paths,
            variable_type,
            engine: self.engine,
        })
    }

    pub fn open_sync(self) -> Result<Variable> {
        run_blocking(|| self.open())
    }
}

/// One persisted variable.
#[derive(Debug)]
pub struct Variable {
    identity: VariableIdentity,
    storage: Arc<dyn Storage>,
    settings: VariableSettings,
    paths: VariablePaths,
    variable_type: Option<VariableType>,
    engine: Option<DistributedContext>,
}

impl Variable {
    pub fn builder(identity: VariableIdentity, storage: Arc<dyn Storage>) -> VariableBuilder {
        VariableBuilder {
            identity,
            storage,
            settings: VariableSettings::default(),
            variable_type: None,
            engine: None,
        }
    }

    /// Block directory for `block_uuid` under the default variables directory.
    pub fn dir_path(pipeline_path: &Path, block_uuid: &str) -> PathBuf {
        VariablePaths::block_dir(pipeline_path, DEFAULT_VARIABLES_DIR, block_uuid)
    }

    pub fn identity(&self) -> &VariableIdentity {
        &self.identity
    }

    pub fn uuid(&self) -> &str {
        self.identity.uuid.as_str()
    }

    pub fn variable_type(&self) -> Option<VariableType> {
        self.variable_type
    }

    pub fn paths(&self) -> &VariablePaths {
        &self.paths
    }

    pub fn variable_dir_path(&self) -> &Path {
        self.paths.variable_dir()
    }

    pub fn variable_path(&self) -> &Path {
        self.paths.variable_path()
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn settings(&self) -> &VariableSettings {
        &self.settings
    }

    /// The variable directory, or `filename` inside it.
    pub fn full_path(&self, filename: Option<&str>) -> PathBuf {
        match filename {
            Some(name) => self.paths.file(name),
            None => self.paths.variable_path().to_path_buf(),
        }
    }

    /// Replace the tag, e.g. before rewriting a variable as another variant.
    pub fn reset_variable_type(&mut self, variable_type: Option<VariableType>) {
        self.variable_type = variable_type;
    }

    fn ctx(&self) -> VariantContext<'_> {
        VariantContext::new(self.storage.as_ref(), &self.paths, &self.settings)
    }

    // ---- write ----------------------------------------------------------

    /// Write `value`; any failure is returned.
    pub fn write_data(&mut self, value: &VariableValue) -> Result<()> {
        run_blocking(|| self.write_with_policy(value, FailurePolicy::Propagate))
    }

    /// Write `value`; failures writing the record files are logged instead.
    pub async fn write_data_async(&mut self, value: &VariableValue) -> Result<()> {
        self.write_with_policy(value, FailurePolicy::LogAndContinue)
            .await
    }

    async fn write_with_policy(
        &mut self,
        value: &VariableValue,
        policy: FailurePolicy,
    ) -> Result<()> {
        let requested = classify_value(value, self.variable_type);
        let layout = match (self.variable_type, storable_as(requested, value)) {
            (Some(tagged), _) if tagged != requested => None,
            (_, layout) => layout,
        };
        let Some(layout) = layout else {
            return Err(unsupported(self.variable_type.unwrap_or(requested), value));
        };
        if layout != requested {
            log::debug!(
                "{} value of {} is stored in the {} layout",
                value.kind(),
                self.identity,
                layout
            );
        }
        if requested == VariableType::Series && layout == VariableType::Generic {
            self.remove_columnar_files().await?;
        }

        self.write_variant(layout, value, policy).await?;
        let variable_type = *self.variable_type.get_or_insert(requested);

        if variable_type.writes_metadata() {
            self.write_metadata_async().await?;
        }
        Ok(())
    }

    /// Drop a columnar layout that would shadow the generic records.
    async fn remove_columnar_files(&self) -> Result<()> {
        for name in [PARQUET_FILE, PARQUET_SAMPLE_FILE, COLUMN_TYPES_FILE] {
            self.storage.remove(&self.paths.file(name)).await?;
        }
        Ok(())
    }

    async fn write_variant(
        &self,
        variant: VariableType,
        value: &VariableValue,
        policy: FailurePolicy,
    ) -> Result<()> {
        let ctx = self.ctx();
        match (variant, value) {
            (VariableType::Tabular, VariableValue::Frame(frame)) => tabular::write(ctx, frame).await,
            (VariableType::Tabular, VariableValue::Batch(batch)) => {
                tabular::write(ctx, &Frame::from_record_batch(batch)?).await
            }
            (VariableType::TabularAltEngine, VariableValue::Batch(batch)) => {
                alt_engine::write(ctx, batch).await
            }
            (VariableType::Distributed, value) => {
                distributed::write(ctx, value, self.engine.as_ref()).await
            }
            (VariableType::Geospatial, VariableValue::Geo(geo)) => geospatial::write(ctx, geo).await,
            (VariableType::SparseMatrix, value) => sparse::write(ctx, value, policy).await,
            (VariableType::Series, value) => series::write(ctx, value).await,
            (VariableType::ModelArtifact, VariableValue::Model(artifact)) => {
                model::write(ctx, artifact, policy).await
            }
            (VariableType::FrameAnalysis, VariableValue::Json(record)) => {
                analysis::write(ctx, record).await
            }
            (_, value) => generic::write(ctx, &value.to_json()?, policy).await,
        }
    }

    /// Persist `{"type": <tag>}` for the current tag.
    pub async fn write_metadata_async(&self) -> Result<()> {
        let Some(variable_type) = self.variable_type else {
            log::debug!("No tag to record for {}", self.identity);
            return Ok(());
        };
        self.ctx().ensure_dir().await?;
        write_json_file(
            self.storage.as_ref(),
            &self.paths.metadata(),
            &json!({ "type": variable_type.as_str() }),
        )
        .await?;
        Ok(())
    }

    pub fn write_metadata(&self) -> Result<()> {
        run_blocking(|| self.write_metadata_async())
    }

    /// Run `write` against a buffered handle for `filename` in the variable directory.
    pub async fn open_to_write_async<F>(&self, filename: &str, write: F) -> Result<u64>
    where
        F: FnOnce(&mut dyn Write) -> varstore_filestore::Result<()>,
    {
        self.ctx().ensure_dir().await?;
        Ok(open_to_write(self.storage.as_ref(), &self.paths.file(filename), write).await?)
    }

    pub fn open_to_write<F>(&self, filename: &str, write: F) -> Result<u64>
    where
        F: FnOnce(&mut dyn Write) -> varstore_filestore::Result<()> + Send,
    {
        run_blocking(|| self.open_to_write_async(filename, write))
    }

    // ---- read -----------------------------------------------------------

    pub fn read_data(&self, options: &ReadOptions) -> Result<VariableValue> {
        run_blocking(|| self.read_data_async(options))
    }

    pub async fn read_data_async(&self, options: &ReadOptions) -> Result<VariableValue> {
        let ctx = self.ctx();
        let value = match self.variable_type {
            Some(VariableType::Tabular) => VariableValue::Frame(tabular::read(ctx, options).await?),
            Some(VariableType::TabularAltEngine) => {
                VariableValue::Batch(alt_engine::read(ctx, options).await?)
            }
            Some(VariableType::Distributed) => VariableValue::Distributed(
                distributed::read(ctx, options, self.engine.as_ref()).await?,
            ),
            Some(VariableType::Geospatial) => geospatial::read(ctx, options).await?,
            Some(VariableType::SparseMatrix) => sparse::read(ctx, options).await?,
            Some(VariableType::Series) => series::read(ctx, options).await?,
            Some(VariableType::ModelArtifact) => VariableValue::Model(model::read(ctx).await?),
            Some(VariableType::FrameAnalysis) => {
                VariableValue::Json(analysis::read(ctx, options).await?)
            }
            Some(VariableType::Generic) | None => {
                VariableValue::Json(generic::read(ctx, options).await?)
            }
        };
        Ok(value)
    }

    // ---- delete ---------------------------------------------------------

    /// Remove everything this variable stored, in both layouts. Deleting twice is a no-op.
    pub async fn delete_async(&self) -> Result<()> {
        let ctx = self.ctx();
        let variant = match self.variable_type {
            Some(variant) => Some(variant),
            None if self.storage.path_exists(&ctx.file(PARQUET_FILE)).await? => {
                Some(VariableType::Tabular)
            }
            None => None,
        };

        if variant == Some(VariableType::FrameAnalysis) {
            return analysis::delete(ctx).await;
        }

        self.storage.remove(self.paths.legacy_record()).await?;
        self.storage.remove_dir(self.paths.variable_path()).await?;
        log::debug!("Deleted variable {}", self.identity);
        Ok(())
    }

    pub fn delete(&self) -> Result<()> {
        run_blocking(|| self.delete_async())
    }

    // ---- export ---------------------------------------------------------

    /// Write `data.csv` next to a tabular variable's data. Existing exports are kept.
    pub async fn convert_to_csv_async(&self) -> Result<()> {
        if self.variable_type != Some(VariableType::Tabular) {
            log::debug!("{} is not tabular; nothing to export", self.identity);
            return Ok(());
        }
        let path = self.paths.file(CSV_FILE);
        if self.storage.path_exists(&path).await? {
            return Ok(());
        }

        let frame = tabular::read(self.ctx(), &ReadOptions::default()).await?;
        let batch = csv_batch(&frame)?;
        let size = open_to_write(self.storage.as_ref(), &path, |out| write_csv(&batch, out)).await?;
        log::debug!("Exported {} bytes of CSV to {}", size, path.display());
        Ok(())
    }

    pub fn convert_to_csv(&self) -> Result<()> {
        run_blocking(|| self.convert_to_csv_async())
    }
}

/// Serializer layout used for `value` under the tag `requested`.
///
/// A frame under the alternate-engine tag goes through the tabular codec and
/// a series tag falls through to generic records for any other value. `None`
/// means the tag cannot hold the value.
fn storable_as(requested: VariableType, value: &VariableValue) -> Option<VariableType> {
    let fits = match requested {
        VariableType::Tabular => matches!(value, VariableValue::Frame(_) | VariableValue::Batch(_)),
        VariableType::TabularAltEngine => matches!(value, VariableValue::Batch(_)),
        VariableType::Distributed => matches!(
            value,
            VariableValue::Distributed(_) | VariableValue::Batch(_) | VariableValue::Frame(_)
        ),
        VariableType::Geospatial => matches!(value, VariableValue::Geo(_)),
        VariableType::SparseMatrix => matches!(
            value,
            VariableValue::SparseMatrix(_) | VariableValue::SparseMatrices(_)
        ),
        VariableType::Series => {
            matches!(value, VariableValue::Series(_) | VariableValue::SeriesList(_))
        }
        VariableType::ModelArtifact => matches!(value, VariableValue::Model(_)),
        VariableType::FrameAnalysis => matches!(value, VariableValue::Json(_)),
        VariableType::Generic => !matches!(value, VariableValue::Distributed(_)),
    };
    match (fits, requested, value) {
        (true, _, _) => Some(requested),
        (false, VariableType::TabularAltEngine, VariableValue::Frame(_)) => {
            Some(VariableType::Tabular)
        }
        (false, VariableType::Series, VariableValue::Distributed(_)) => None,
        (false, VariableType::Series, _) => Some(VariableType::Generic),
        _ => None,
    }
}
