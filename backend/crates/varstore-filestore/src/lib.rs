//! # varstore-filestore
//!
//! Storage backends and file codecs for varstore.
//!
//! - **Storage**: async backend contract with blocking wrappers on `dyn Storage`
//! - **ObjectStorage**: `object_store`-backed implementation (local, memory, S3, GCS, Azure)
//! - **Records**: JSON record files with default-on-missing semantics
//! - **Parquet**: Arrow RecordBatch <-> Parquet with footer key-value metadata
//! - **Write handles**: buffered writes that only land on success
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use varstore_filestore::{build_storage, read_json_file, write_json_file};
//!
//! let storage = build_storage(&config.storage)?;
//! write_json_file(storage.as_ref(), &path, &serde_json::json!({"type": "generic"})).await?;
//! let value: serde_json::Value =
//!     read_json_file(storage.as_ref(), &path, serde_json::Value::Null, false).await?;
//! ```

pub mod core;
pub mod error;
pub mod object_storage;
pub mod parquet;
pub mod records;
pub mod storage;
pub mod write_handle;

// Re-export commonly used types
pub use crate::core::factory::build_storage;
pub use crate::core::runtime::run_blocking;
pub use error::{FilestoreError, Result};
pub use object_storage::ObjectStorage;
pub use parquet::{
    parse_parquet_from_bytes, read_parquet, read_parquet_sync, serialize_to_parquet,
    write_parquet, write_parquet_sync, ParquetTable, ParquetWriteResult,
};
pub use records::{read_json_file, read_json_file_sync, write_json_file, write_json_file_sync};
pub use storage::Storage;
pub use write_handle::{open_to_write, open_to_write_sync};
