//! Classification from persisted evidence.
//!
//! Evidence is gathered once into a [`DiskProbe`]; [`classify`] then walks an
//! ordered strategy table and the first strategy that answers wins.

use crate::error::Result;
use crate::paths::VariablePaths;
use serde::Deserialize;
use std::str::FromStr;
use varstore_commons::constants::{GEO_FILE, PARQUET_FILE};
use varstore_commons::VariableType;
use varstore_filestore::{read_json_file, Storage};

/// What is on disk for one variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskProbe {
    /// Tag from a readable `type.json`.
    pub metadata: Option<VariableType>,
    pub has_parquet: bool,
    pub has_geo_marker: bool,
    /// `*.parquet` files directly under the variable path (only probed with an engine).
    pub columnar_files: usize,
    pub engine_available: bool,
}

type Strategy = fn(&DiskProbe) -> Option<VariableType>;

/// Ordered resolution table.
pub const STRATEGIES: [(&str, Strategy); 5] = [
    ("metadata", from_metadata),
    ("geo_over_tabular_metadata", geo_over_tabular_metadata),
    ("columnar_file", from_columnar_file),
    ("geo_marker", from_geo_marker),
    ("distributed_files", from_distributed_files),
];

fn from_metadata(probe: &DiskProbe) -> Option<VariableType> {
    probe.metadata.filter(|t| *t != VariableType::Tabular)
}

// A tabular tag may hide a geospatial variable written by older versions
fn geo_over_tabular_metadata(probe: &DiskProbe) -> Option<VariableType> {
    match probe.metadata {
        Some(VariableType::Tabular) if probe.has_geo_marker => Some(VariableType::Geospatial),
        Some(VariableType::Tabular) => Some(VariableType::Tabular),
        _ => None,
    }
}

fn from_columnar_file(probe: &DiskProbe) -> Option<VariableType> {
    probe.has_parquet.then_some(VariableType::Tabular)
}

fn from_geo_marker(probe: &DiskProbe) -> Option<VariableType> {
    probe.has_geo_marker.then_some(VariableType::Geospatial)
}

fn from_distributed_files(probe: &DiskProbe) -> Option<VariableType> {
    (probe.engine_available && probe.columnar_files > 0).then_some(VariableType::Distributed)
}

/// First answer of the strategy table; `None` leaves the generic path in charge.
pub fn classify(probe: &DiskProbe) -> Option<VariableType> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let found = strategy(probe);
        if let Some(variable_type) = found {
            log::debug!("Classified as {} by '{}'", variable_type, name);
        }
        found
    })
}

#[derive(Debug, Deserialize)]
struct MetadataRecord {
    #[serde(rename = "type")]
    variable_type: Option<String>,
}

/// Tag from `type.json`. Missing, unreadable or unknown tags are logged and yield `None`.
pub async fn read_metadata(storage: &dyn Storage, paths: &VariablePaths) -> Option<VariableType> {
    let path = paths.metadata();
    match storage.path_exists(&path).await {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            log::warn!("Cannot check metadata record {}: {}", path.display(), e);
            return None;
        }
    }

    let record: Option<MetadataRecord> = match read_json_file(storage, &path, None, true).await {
        Ok(record) => record,
        Err(e) => {
            log::warn!("Corrupt metadata record {}: {}", path.display(), e);
            return None;
        }
    };

    let tag = record?.variable_type?;
    match VariableType::from_str(&tag) {
        Ok(variable_type) => Some(variable_type),
        Err(e) => {
            log::warn!("Corrupt metadata record {}: {}", path.display(), e);
            None
        }
    }
}

/// Gather the evidence the strategy table needs.
pub async fn probe(
    storage: &dyn Storage,
    paths: &VariablePaths,
    engine_available: bool,
) -> Result<DiskProbe> {
    let metadata = read_metadata(storage, paths).await;
    let has_parquet = storage.path_exists(&paths.file(PARQUET_FILE)).await?;
    let has_geo_marker = storage.path_exists(&paths.file(GEO_FILE)).await?;
    let columnar_files = if engine_available {
        storage
            .listdir(paths.variable_path(), Some(".parquet"))
            .await?
            .len()
    } else {
        0
    };

    Ok(DiskProbe {
        metadata,
        has_parquet,
        has_geo_marker,
        columnar_files,
        engine_available,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_probe_is_unclassified() {
        assert_eq!(classify(&DiskProbe::default()), None);
    }

    #[test]
    fn test_metadata_wins_over_files() {
        let probe = DiskProbe {
            metadata: Some(VariableType::Generic),
            has_parquet: true,
            has_geo_marker: true,
            ..Default::default()
        };
        assert_eq!(classify(&probe), Some(VariableType::Generic));
    }

    #[test]
    fn test_geo_marker_overrides_tabular_metadata() {
        let probe = DiskProbe {
            metadata: Some(VariableType::Tabular),
            has_geo_marker: true,
            ..Default::default()
        };
        assert_eq!(classify(&probe), Some(VariableType::Geospatial));
    }

    #[test]
    fn test_parquet_file_means_tabular() {
        let probe = DiskProbe {
            has_parquet: true,
            has_geo_marker: true,
            ..Default::default()
        };
        assert_eq!(classify(&probe), Some(VariableType::Tabular));
    }

    #[test]
    fn test_geo_marker_alone() {
        let probe = DiskProbe {
            has_geo_marker: true,
            ..Default::default()
        };
        assert_eq!(classify(&probe), Some(VariableType::Geospatial));
    }

    #[test]
    fn test_distributed_needs_engine() {
        let mut probe = DiskProbe {
            columnar_files: 3,
            ..Default::default()
        };
        assert_eq!(classify(&probe), None);
        probe.engine_available = true;
        assert_eq!(classify(&probe), Some(VariableType::Distributed));
    }

    #[test]
    fn test_strategy_order() {
        let names: Vec<&str> = STRATEGIES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "metadata",
                "geo_over_tabular_metadata",
                "columnar_file",
                "geo_marker",
                "distributed_files"
            ]
        );
    }
}
