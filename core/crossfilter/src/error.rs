//! FILENAME: core/crossfilter/src/error.rs

use thiserror::Error;

/// A key function could not produce a key for a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("{0}")]
    Invalid(String),
}

/// A reducer was asked to remove a record it never saw.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0}")]
pub struct Underflow(pub &'static str);

#[derive(Error, Debug)]
pub enum CrossfilterError {
    #[error("dimension '{dimension}' cannot extract a key from record {record}: {source}")]
    Configuration {
        dimension: String,
        record: usize,
        #[source]
        source: KeyError,
    },

    #[error("Unknown dimension: {0}")]
    UnknownDimension(usize),

    #[error("Unknown record: {0}")]
    UnknownRecord(usize),

    #[error("Unknown group: {0}")]
    UnknownGroup(usize),

    #[error("An index supports at most {max} dimensions")]
    TooManyDimensions { max: usize },

    #[error("Invalid buckets: {0}")]
    InvalidBuckets(String),

    #[error("group {group}, key '{key}': accumulator invariant violated: {detail}")]
    InvariantViolation {
        group: usize,
        key: String,
        detail: Underflow,
    },

    #[error("Filter cascade exceeded {0} queued changes")]
    CascadeLimit(usize),
}
