// varstore Core Library
//
// This crate provides the variable persistence engine for varstore:
// the column type codec, the type classifier, one serializer per variant,
// and the Variable facade tying them to a storage backend.

pub mod classifier;
pub mod codec;
pub mod engine;
pub mod error;
pub mod export;
pub mod options;
pub mod paths;
pub mod variable;
pub mod variants;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use engine::DistributedContext;
pub use error::{Result, VariableError};
pub use options::{FailurePolicy, ReadOptions};
pub use paths::VariablePaths;
pub use variable::{Variable, VariableBuilder};
