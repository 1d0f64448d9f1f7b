//! FILENAME: app/dashboard/src/config.rs
//! PURPOSE: Dashboard configuration, read from an optional JSON file.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use records::ParsePolicy;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Varieties stacked in the national variety chart, in stacking order.
pub const DEFAULT_VARIETIES: [&str; 9] = [
    "Cabernet Sauvignon",
    "Malbec",
    "Bordeaux-style Red Blend",
    "Pinot Noir",
    "Syrah",
    "Grenache",
    "Merlot",
    "Tempranillo",
    "Red Blend",
];

pub const DEFAULT_DATA_PATH: &str = "data/winedata.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV dataset to load at startup.
    pub data_path: PathBuf,
    pub parse_policy: ParsePolicy,
    /// Targets of the national variety chart.
    pub varieties: Vec<String>,
    pub log_level: LevelFilter,
    /// Unified log file; stderr only when absent.
    pub log_file: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            parse_policy: ParsePolicy::Reject,
            varieties: DEFAULT_VARIETIES.iter().map(|v| v.to_string()).collect(),
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_json(text: &str) -> Result<Self, DashboardError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let text = std::fs::read_to_string(path).map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, DashboardError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
