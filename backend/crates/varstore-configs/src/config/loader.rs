use super::types::{AppConfig, StorageBackend};
use crate::file_helpers::normalize_dir_path;
use std::fs;
use std::path::Path;

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const VALID_LOG_FORMATS: [&str; 2] = ["compact", "json"];

impl AppConfig {
    /// Load configuration from a TOML file
    ///
    /// Note: Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.finalize()?;

        Ok(config)
    }

    /// Apply `VARSTORE_*` environment variables on top of the file settings.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as `apply_env_overrides` with an explicit variable source.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("VARSTORE_STORAGE_BACKEND") {
            self.storage.backend = backend
                .parse::<StorageBackend>()
                .map_err(|e| anyhow::anyhow!("Invalid VARSTORE_STORAGE_BACKEND value: {}", e))?;
        }

        if let Some(dir) = lookup("VARSTORE_BASE_DIR") {
            self.storage.base_directory = dir;
        }

        if let Some(bucket) = lookup("VARSTORE_BUCKET") {
            self.storage.bucket = Some(bucket);
        }

        if let Some(region) = lookup("VARSTORE_REGION") {
            self.storage.region = Some(region);
        }

        if let Some(endpoint) = lookup("VARSTORE_ENDPOINT") {
            self.storage.endpoint = Some(endpoint);
        }

        if let Some(dir) = lookup("VARSTORE_VARIABLES_DIR") {
            self.variables.variables_dir = dir;
        }

        if let Some(count) = lookup("VARSTORE_SAMPLE_COUNT") {
            self.variables.sample_count = count
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid VARSTORE_SAMPLE_COUNT value: {}", count))?;
        }

        if let Some(cols) = lookup("VARSTORE_SAMPLE_MAX_COLUMNS") {
            self.variables.sample_max_columns = cols.parse().map_err(|_| {
                anyhow::anyhow!("Invalid VARSTORE_SAMPLE_MAX_COLUMNS value: {}", cols)
            })?;
        }

        if let Some(level) = lookup("VARSTORE_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Some(format) = lookup("VARSTORE_LOG_FORMAT") {
            self.logging.format = format.to_lowercase();
        }

        if let Some(val) = lookup("VARSTORE_LOG_TO_CONSOLE") {
            self.logging.log_to_console =
                val.eq_ignore_ascii_case("true") || val == "1" || val.eq_ignore_ascii_case("yes");
        }

        Ok(())
    }

    /// Normalize local filesystem paths to absolute paths.
    fn normalize_paths(&mut self) {
        if self.storage.backend == StorageBackend::Local {
            self.storage.base_directory = normalize_dir_path(&self.storage.base_directory);
        }
        self.logging.logs_path = normalize_dir_path(&self.logging.logs_path);
    }

    /// Normalize paths and validate configuration.
    ///
    /// Call this after applying environment overrides.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.normalize_paths();

        self.validate()?;

        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                VALID_LOG_FORMATS.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LOG_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LOG_LEVELS.join(", ")
                ));
            }
        }

        if self.variables.sample_count == 0 {
            return Err(anyhow::anyhow!("sample_count cannot be 0"));
        }

        if self.variables.sample_max_columns == 0 {
            return Err(anyhow::anyhow!("sample_max_columns cannot be 0"));
        }

        let variables_dir = self.variables.variables_dir.trim();
        if variables_dir.is_empty() || variables_dir.contains("..") {
            return Err(anyhow::anyhow!(
                "variables_dir '{}' must be a non-empty relative directory name",
                self.variables.variables_dir
            ));
        }

        if self.storage.backend.is_remote()
            && self.storage.bucket.is_none()
            && !self.storage.base_directory.contains("://")
        {
            return Err(anyhow::anyhow!(
                "Storage backend '{}' requires a bucket",
                self.storage.backend
            ));
        }

        if self.storage.remote_timeouts.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("request_timeout_secs cannot be 0"));
        }

        Ok(())
    }
}
