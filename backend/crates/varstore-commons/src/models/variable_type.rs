use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Variant tag selecting the serializer and file set of a variable.
///
/// Persisted in `type.json` as `{"type": "<tag>"}`. An absent tag means the
/// generic path applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    /// Frame with Arrow-native and object columns
    Tabular,
    /// Plain Arrow record batch
    TabularAltEngine,
    /// DataFusion dataframe owned by an external session
    Distributed,
    /// Frame with a WKT geometry column
    Geospatial,
    SparseMatrix,
    Series,
    ModelArtifact,
    Generic,
    /// Analysis documents attached to a tabular variable
    FrameAnalysis,
}

impl VariableType {
    pub const ALL: [VariableType; 9] = [
        VariableType::Tabular,
        VariableType::TabularAltEngine,
        VariableType::Distributed,
        VariableType::Geospatial,
        VariableType::SparseMatrix,
        VariableType::Series,
        VariableType::ModelArtifact,
        VariableType::Generic,
        VariableType::FrameAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Tabular => "tabular",
            VariableType::TabularAltEngine => "tabular_alt_engine",
            VariableType::Distributed => "distributed",
            VariableType::Geospatial => "geospatial",
            VariableType::SparseMatrix => "sparse_matrix",
            VariableType::Series => "series",
            VariableType::ModelArtifact => "model_artifact",
            VariableType::Generic => "generic",
            VariableType::FrameAnalysis => "frame_analysis",
        }
    }

    /// Whether a successful write also persists `type.json`.
    pub fn writes_metadata(&self) -> bool {
        !matches!(self, VariableType::Distributed | VariableType::FrameAnalysis)
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        VariableType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("Unknown variable type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_strings_match_serde() {
        for t in VariableType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<VariableType>().unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert!("dataframe_v9".parse::<VariableType>().is_err());
    }

    #[test]
    fn test_metadata_exclusions() {
        assert!(VariableType::Tabular.writes_metadata());
        assert!(!VariableType::Distributed.writes_metadata());
        assert!(!VariableType::FrameAnalysis.writes_metadata());
    }
}
