//! Column Type Codec.
//!
//! Carries column-level type information the columnar format cannot express
//! through a side-channel descriptor (`data_column_types.json`).

pub mod decode;
pub mod descriptor;
pub mod encode;

pub use decode::{restore_column, restore_frame};
pub use descriptor::{ColumnTypes, ColumnTypesFile, RecordedType, SeriesColumns};
pub use encode::{encode_frame, serialize_object_columns, EncodedFrame};
