//! # varstore-commons
//!
//! Shared types, constants, and utilities for varstore.
//!
//! This crate provides the foundational value model used across all varstore crates
//! (varstore-filestore, varstore-core and the `varstore` binary).
//!
//! ## Value Model
//!
//! - `Cell`: a dynamically-typed value living in an object column
//! - `Frame`: an ordered set of named columns, each either Arrow-native or object
//! - `Series`: a single named column with an index
//! - `GeoFrame`: a frame with a WKT geometry column
//! - `CsrMatrix`: a compressed sparse row matrix
//! - `ModelArtifact`: an opaque fitted model with its origin
//! - `VariableValue`: the tagged union of everything a variable can hold
//!
//! ## Identity
//!
//! - `VariableIdentity`: `(pipeline_path, partition, block_uuid, uuid)`
//! - `VariableType`: the variant tag persisted in `type.json`
//!
//! ## Example Usage
//!
//! ```rust
//! use varstore_commons::models::{Cell, Column, ColumnData, Frame};
//!
//! let frame = Frame::new(vec![Column::new(
//!     "b",
//!     ColumnData::Object(vec![Cell::from("x"), Cell::Int(2), Cell::from("z")]),
//! )])
//! .unwrap();
//! assert_eq!(frame.num_rows(), 3);
//! ```

pub mod arrow_conversion;
pub mod constants;
pub mod errors;
pub mod helpers;
pub mod models;

pub use errors::{CommonError, Result};
pub use helpers::naming::clean_name;
pub use models::{
    BlockUuid, Cell, Column, ColumnData, CsrMatrix, Frame, GeoFrame, InferredType,
    ModelArtifact, Series, VariableIdentity, VariableType, VariableUuid, VariableValue,
};
