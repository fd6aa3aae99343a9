use crate::errors::{CommonError, Result};
use crate::models::frame::Frame;
use serde_json::json;

/// A frame whose geometry column holds WKT text.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFrame {
    pub frame: Frame,
    pub geometry_column: String,
    pub crs: Option<String>,
}

impl GeoFrame {
    pub fn new(frame: Frame, geometry_column: impl Into<String>) -> Result<Self> {
        let geometry_column = geometry_column.into();
        if frame.column(&geometry_column).is_none() {
            return Err(CommonError::ColumnNotFound(geometry_column));
        }
        Ok(Self {
            frame,
            geometry_column,
            crs: None,
        })
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn num_rows(&self) -> usize {
        self.frame.num_rows()
    }

    pub fn head(&self, n: usize) -> GeoFrame {
        GeoFrame {
            frame: self.frame.head(n),
            geometry_column: self.geometry_column.clone(),
            crs: self.crs.clone(),
        }
    }

    /// `geo` key-value metadata stored alongside the Parquet data.
    pub fn geo_metadata(&self) -> String {
        json!({
            "version": "1.0.0",
            "primary_column": self.geometry_column,
            "columns": {
                (self.geometry_column.clone()): {
                    "encoding": "WKT",
                    "crs": self.crs,
                }
            }
        })
        .to_string()
    }

    /// Rebuild from a frame plus the `geo` metadata written by [`GeoFrame::geo_metadata`].
    pub fn from_geo_metadata(frame: Frame, metadata: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(metadata)
            .map_err(|e| CommonError::Serialization(format!("Invalid geo metadata: {}", e)))?;
        let geometry_column = value
            .get("primary_column")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                CommonError::Serialization("Geo metadata has no primary_column".to_string())
            })?
            .to_string();
        let crs = value
            .get("columns")
            .and_then(|c| c.get(&geometry_column))
            .and_then(|c| c.get("crs"))
            .and_then(|c| c.as_str())
            .map(str::to_string);

        let mut geo = GeoFrame::new(frame, geometry_column)?;
        geo.crs = crs;
        Ok(geo)
    }
}
