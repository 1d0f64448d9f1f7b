//! FILENAME: app/dashboard/src/loader.rs
//! PURPOSE: Asynchronous dataset load, performed once before the index exists.

use std::path::Path;

use records::{LoadReport, ParsePolicy, RecordStore, WineReview};

use crate::error::DashboardError;
use crate::{log_enter, log_exit, log_info, log_warn};

/// Reads the CSV file without blocking the runtime, then parses it.
/// Any failure is returned before an index could be built.
pub async fn load_dataset(
    path: &Path,
    policy: ParsePolicy,
) -> Result<(RecordStore<WineReview>, LoadReport), DashboardError> {
    log_enter!("LOAD", "load_dataset", "path={} policy={:?}", path.display(), policy);

    let bytes = tokio::fs::read(path).await.map_err(|source| DashboardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (store, report) = records::load_csv(bytes.as_slice(), policy)?;

    if !report.skipped.is_empty() {
        log_warn!(
            "LOAD",
            "{} of {} rows skipped",
            report.skipped.len(),
            report.rows_read
        );
    }
    log_info!("LOAD", "loaded {} records from {}", report.loaded, path.display());
    log_exit!("LOAD", "load_dataset", "records={}", store.size());
    Ok((store, report))
}
