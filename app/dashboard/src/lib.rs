//! FILENAME: app/dashboard/src/lib.rs
// PURPOSE: Main library entry point of the wine dashboard.
// CONTEXT: Loads the dataset once, builds the linked widgets over one
// cross-filter index, and renders their views as text or JSON.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod logging;
pub mod render;
pub mod widgets;

pub use config::{DashboardConfig, DEFAULT_DATA_PATH, DEFAULT_VARIETIES};
pub use dashboard::{Dashboard, DataCount};
pub use error::DashboardError;
pub use loader::load_dataset;
pub use logging::{get_log_path, init_log_file, next_seq, write_log};
pub use render::{render_json, render_text};
pub use widgets::{
    parse_filter_arg, Bar, OptionRow, ScatterPoint, Slice, StackedRow, ViewBody, WidgetKind,
    WidgetView,
};
