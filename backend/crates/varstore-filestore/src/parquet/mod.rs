pub mod reader;
pub mod writer;

pub use reader::{parse_parquet_from_bytes, read_parquet, read_parquet_sync, ParquetTable};
pub use writer::{serialize_to_parquet, write_parquet, write_parquet_sync, ParquetWriteResult};
