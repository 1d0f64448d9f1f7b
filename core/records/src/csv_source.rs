//! FILENAME: core/records/src/csv_source.rs
//! PURPOSE: Reads a headed CSV dataset into raw rows.
//! CONTEXT: Only the required columns are retained; everything else in the
//! file (descriptions, winery, ...) is ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::LoadError;
use crate::record::REQUIRED_COLUMNS;
use crate::store::{LoadReport, ParsePolicy, RawRow, RecordStore};

/// Reads all data rows. Fails with `LoadError::MissingColumn` when the header
/// lacks any of the required columns.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();

    let mut columns: Vec<(usize, &str)> = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for required in REQUIRED_COLUMNS {
        let position = headers
            .iter()
            .position(|header| header.trim_start_matches('\u{feff}') == required)
            .ok_or_else(|| LoadError::MissingColumn(required.to_string()))?;
        columns.push((position, required));
    }

    let mut rows = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        let mut row = RawRow::new(index + 1);
        for &(position, name) in &columns {
            // Short rows leave the cell absent, which parsing reports.
            if let Some(value) = record.get(position) {
                row.insert(name, value);
            }
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Reads and parses a CSV dataset in one step.
pub fn load_csv<R: Read>(
    reader: R,
    policy: ParsePolicy,
) -> Result<(RecordStore, LoadReport), LoadError> {
    let rows = read_rows(reader)?;
    RecordStore::load(rows, policy)
}

pub fn load_csv_path(
    path: &Path,
    policy: ParsePolicy,
) -> Result<(RecordStore, LoadReport), LoadError> {
    let file = File::open(path)?;
    load_csv(file, policy)
}
