//! FILENAME: app/dashboard/src/error.rs

use std::path::PathBuf;

use crossfilter_engine::CrossfilterError;
use records::LoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to load dataset: {0}")]
    Load(#[from] LoadError),

    #[error("Index error: {0}")]
    Index(#[from] CrossfilterError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Unknown widget: {0}")]
    UnknownWidget(String),

    #[error("Widget {0} does not accept selections")]
    NotSelectable(String),

    #[error("'{label}' is not an option of {widget}")]
    UnknownLabel { widget: String, label: String },

    #[error("Invalid filter argument '{0}', expected WIDGET=LABEL")]
    InvalidArgument(String),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
