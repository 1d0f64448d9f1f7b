//! FILENAME: core/records/src/lib.rs
//! PURPOSE: Wine review records and the immutable record store.
//! CONTEXT: Everything that turns a dataset into typed, validated records.
//! The cross-filter engine only ever sees a fully loaded `RecordStore`.

pub mod csv_source;
pub mod error;
pub mod record;
pub mod store;

pub use csv_source::{load_csv, load_csv_path, read_rows};
pub use error::{LoadError, ParseError, ParseFailure};
pub use record::{FieldValue, Fields, WineReview, COUNTRY, POINTS, PRICE, REQUIRED_COLUMNS, VARIETY};
pub use store::{parse_row, parse_integer, LoadReport, ParsePolicy, RawRow, RecordStore};
