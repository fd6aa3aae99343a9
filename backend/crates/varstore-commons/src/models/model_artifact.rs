//! Fitted model artifacts.
//!
//! Models are opaque to the store: a model is captured as its origin (module
//! and type name) plus a bincode-encoded state blob. Callers that own the model
//! type use [`ModelArtifact::from_model`] and [`ModelArtifact::into_model`].

use crate::errors::{CommonError, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Origin of a model, persisted as the small `data.json` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactOrigin {
    pub module: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub module: String,
    pub name: String,
    pub state: Vec<u8>,
}

impl ModelArtifact {
    pub fn new(module: impl Into<String>, name: impl Into<String>, state: Vec<u8>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            state,
        }
    }

    /// Capture a serde-serialisable model.
    pub fn from_model<T: Serialize>(
        module: impl Into<String>,
        name: impl Into<String>,
        model: &T,
    ) -> Result<Self> {
        let state = encode(model)?;
        Ok(Self::new(module, name, state))
    }

    /// Restore the typed model from its state blob.
    pub fn into_model<T: DeserializeOwned>(&self) -> Result<T> {
        decode(&self.state)
    }

    pub fn origin(&self) -> ArtifactOrigin {
        ArtifactOrigin {
            module: self.module.clone(),
            name: self.name.clone(),
        }
    }

    /// Binary file form of the whole artifact.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| CommonError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| CommonError::Serialization(e.to_string()))?;
    Ok(value)
}
