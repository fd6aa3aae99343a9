use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub variables: VariableSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where variable bytes live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    S3,
    Gcs,
    Azure,
    /// Process-local, for tests and dry runs
    Memory,
}

impl StorageBackend {
    pub fn is_remote(&self) -> bool {
        matches!(self, StorageBackend::S3 | StorageBackend::Gcs | StorageBackend::Azure)
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Gcs => write!(f, "gcs"),
            StorageBackend::Azure => write!(f, "azure"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "filesystem" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            "gcs" | "gs" => Ok(StorageBackend::Gcs),
            "azure" | "az" => Ok(StorageBackend::Azure),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root for local storage; key prefix inside the bucket for remote storage.
    /// Default: "."
    #[serde(default = "default_base_directory")]
    pub base_directory: String,
    /// Bucket or container name (remote backends only)
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Remote storage timeout settings (S3, GCS, Azure)
    #[serde(default)]
    pub remote_timeouts: RemoteStorageTimeouts,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            base_directory: default_base_directory(),
            bucket: None,
            region: None,
            endpoint: None,
            remote_timeouts: RemoteStorageTimeouts::default(),
        }
    }
}

/// Remote storage timeout settings for S3, GCS, Azure backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStorageTimeouts {
    /// Request timeout in seconds for remote storage operations (default: 60s)
    #[serde(default = "default_remote_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds (default: 10s)
    #[serde(default = "default_remote_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for RemoteStorageTimeouts {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_remote_request_timeout(),
            connect_timeout_secs: default_remote_connect_timeout(),
        }
    }
}

/// Variable layout, sampling and column codec settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableSettings {
    /// Directory under the pipeline path holding block variables (default: ".variables")
    #[serde(default = "default_variables_dir")]
    pub variables_dir: String,
    /// Maximum rows kept in sample artifacts (N)
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    /// Maximum columns kept in sample artifacts (M)
    #[serde(default = "default_sample_max_columns")]
    pub sample_max_columns: usize,
    /// Class names cast to string and recorded verbatim in the column type descriptor
    #[serde(default = "default_string_serializable_types")]
    pub string_serializable_types: Vec<String>,
    /// Inferred column types cast to string before writing
    #[serde(default = "default_ambiguous_column_types")]
    pub ambiguous_column_types: Vec<String>,
    /// Sanitise block identifiers before using them as directory names
    #[serde(default = "default_true")]
    pub clean_block_uuid: bool,
}

impl Default for VariableSettings {
    fn default() -> Self {
        Self {
            variables_dir: default_variables_dir(),
            sample_count: default_sample_count(),
            sample_max_columns: default_sample_max_columns(),
            string_serializable_types: default_string_serializable_types(),
            ambiguous_column_types: default_ambiguous_column_types(),
            clean_block_uuid: default_true(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for log files (default: "./logs")
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// Also write `varstore.log` under `logs_path`
    #[serde(default)]
    pub log_to_file: bool,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional per-target log level overrides:
    /// [logging.targets]
    /// datafusion = "info"
    /// parquet = "warn"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_path: default_logs_path(),
            log_to_console: default_true(),
            log_to_file: false,
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}
