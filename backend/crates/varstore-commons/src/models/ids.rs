//! Type-safe wrappers for block and variable identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type for identifier validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdValidationError(pub String);

impl fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IdValidationError {}

/// Rejects identifiers that would escape their parent directory when joined into a path.
fn validate_path_segment(kind: &str, id: &str) -> Result<(), IdValidationError> {
    if id.is_empty() {
        return Err(IdValidationError(format!("{} cannot be empty", kind)));
    }
    if id == "." || id.contains("..") {
        return Err(IdValidationError(format!("{} cannot contain '..' (path traversal)", kind)));
    }
    if id.contains('\\') {
        return Err(IdValidationError(format!(
            "{} cannot contain '\\' (directory separator)",
            kind
        )));
    }
    if id.contains('\0') {
        return Err(IdValidationError(format!("{} cannot contain null bytes", kind)));
    }
    Ok(())
}

/// Identifier of the pipeline block that produced a variable.
///
/// Block identifiers may be nested (`group/block`) when blocks live in
/// sub-folders, so `/` is allowed here. The facade sanitises the value before
/// using it as a directory name unless told not to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockUuid(String);

impl BlockUuid {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn validate(&self) -> Result<(), IdValidationError> {
        validate_path_segment("Block uuid", &self.0)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unique name of a variable within its block (`output_0`, `df`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableUuid(String);

impl VariableUuid {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Variable uuids name a single directory, so separators are rejected too.
    pub fn validate(&self) -> Result<(), IdValidationError> {
        validate_path_segment("Variable uuid", &self.0)?;
        if self.0.contains('/') {
            return Err(IdValidationError(
                "Variable uuid cannot contain '/' (directory separator)".to_string(),
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

macro_rules! impl_string_id {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_id!(BlockUuid);
impl_string_id!(VariableUuid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_uuid_rejects_separators() {
        assert!(VariableUuid::new("output_0").validate().is_ok());
        assert!(VariableUuid::new("a/b").validate().is_err());
        assert!(VariableUuid::new("..").validate().is_err());
        assert!(VariableUuid::new("").validate().is_err());
    }

    #[test]
    fn test_block_uuid_allows_nesting() {
        assert!(BlockUuid::new("group/load_data").validate().is_ok());
        assert!(BlockUuid::new("../escape").validate().is_err());
    }

    #[test]
    fn test_display_and_conversions() {
        let id: VariableUuid = "df".into();
        assert_eq!(id.to_string(), "df");
        assert_eq!(id.as_ref(), "df");
        assert_eq!(id.into_string(), "df");
    }
}
