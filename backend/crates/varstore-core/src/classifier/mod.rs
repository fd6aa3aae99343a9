//! Type Classifier.
//!
//! Decides which variant governs a variable, either from what is already on
//! disk ([`disk`]) or from the value about to be written ([`value`]). Both are
//! explicit ordered tables so precedence is visible and tested.

pub mod disk;
pub mod value;

pub use disk::{classify, probe, read_metadata, DiskProbe};
pub use value::classify_value;
