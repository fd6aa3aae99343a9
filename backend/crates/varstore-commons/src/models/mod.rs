//! Value model and identifiers.

pub mod cell;
pub mod frame;
pub mod geo;
pub mod identity;
pub mod ids;
pub mod model_artifact;
pub mod series;
pub mod sparse;
pub mod value;
pub mod variable_type;

pub use cell::{Cell, InferredType};
pub use frame::{Column, ColumnData, Frame};
pub use geo::GeoFrame;
pub use identity::VariableIdentity;
pub use ids::{BlockUuid, VariableUuid};
pub use model_artifact::{ArtifactOrigin, ModelArtifact};
pub use series::Series;
pub use sparse::CsrMatrix;
pub use value::VariableValue;
pub use variable_type::VariableType;
