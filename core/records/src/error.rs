//! FILENAME: core/records/src/error.rs

use thiserror::Error;

/// Why a single cell could not be turned into a typed field.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("required field is missing")]
    Missing,

    #[error("not an integer")]
    NotNumeric,

    #[error("integer out of range")]
    OutOfRange,
}

/// A row that failed to parse. `row` is the 1-based data row number
/// (the header is not counted).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}, column '{column}': {reason} (value: {value:?})")]
pub struct ParseError {
    pub row: usize,
    pub column: String,
    pub value: String,
    pub reason: ParseFailure,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Dataset contains no records")]
    Empty,
}
