//! File names and fixed keys shared by every crate.
//!
//! Everything that ends up on disk is named here so readers and writers cannot drift.

/// Default directory (under the pipeline path) holding all block variables.
pub const DEFAULT_VARIABLES_DIR: &str = ".variables";

/// Metadata record `{ "type": <tag> }`.
pub const METADATA_FILE: &str = "type.json";

/// Tabular columnar files and their side-channel type descriptor.
pub const PARQUET_FILE: &str = "data.parquet";
pub const PARQUET_SAMPLE_FILE: &str = "sample_data.parquet";
pub const COLUMN_TYPES_FILE: &str = "data_column_types.json";
pub const CSV_FILE: &str = "data.csv";

/// Record files for generic values and sparse matrices.
pub const JSON_FILE: &str = "data.json";
pub const JSON_SAMPLE_FILE: &str = "sample_data.json";

/// Legacy single-file layout suffix (`<block_dir>/<uuid>.json`).
pub const LEGACY_JSON_SUFFIX: &str = ".json";

/// Geospatial marker files. The `.sh` extension is kept as-is for compatibility
/// with variables already on disk.
pub const GEO_FILE: &str = "data.sh";
pub const GEO_SAMPLE_FILE: &str = "sample_data.sh";

/// Parquet key-value metadata entry describing geometry columns.
pub const GEO_METADATA_KEY: &str = "geo";

/// Binary artifact file for fitted models.
pub const MODEL_FILE: &str = "model.bin";

/// Column holding a non-default index of a single persisted series.
pub const INDEX_COLUMN: &str = "__index_level_0__";

/// Documents written for the frame analysis variant, in write order.
pub const ANALYSIS_KEYS: [&str; 4] = ["metadata", "statistics", "insights", "suggestions"];

/// Default sample bounds.
pub const DEFAULT_SAMPLE_COUNT: usize = 1000;
pub const DEFAULT_SAMPLE_MAX_COLUMNS: usize = 1000;
