use varstore_commons::constants::{
    DEFAULT_SAMPLE_COUNT, DEFAULT_SAMPLE_MAX_COLUMNS, DEFAULT_VARIABLES_DIR,
};

// Default value functions
pub fn default_true() -> bool {
    true
}

pub fn default_base_directory() -> String {
    ".".to_string() // Pipelines resolve relative to the working directory
}

pub fn default_variables_dir() -> String {
    DEFAULT_VARIABLES_DIR.to_string()
}

pub fn default_sample_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}

pub fn default_sample_max_columns() -> usize {
    DEFAULT_SAMPLE_MAX_COLUMNS
}

/// Classes whose instances round-trip through their string form.
pub fn default_string_serializable_types() -> Vec<String> {
    ["ObjectId", "UUID", "Decimal"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Inferred column types that are cast to string before writing.
pub fn default_ambiguous_column_types() -> Vec<String> {
    ["mixed-integer", "mixed", "complex", "unknown-array"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_remote_request_timeout() -> u64 {
    60
}

pub fn default_remote_connect_timeout() -> u64 {
    10
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_logs_path() -> String {
    "./logs".to_string()
}
