//! FILENAME: core/records/src/store.rs
//! PURPOSE: The immutable, ordered record store and the raw-row load step.
//! CONTEXT: Rows arrive as text (column name -> cell). Numeric columns are
//! parsed here so that nothing downstream has to tolerate malformed data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, ParseError, ParseFailure};
use crate::record::{WineReview, COUNTRY, POINTS, PRICE, VARIETY};

// ============================================================================
// RAW ROWS
// ============================================================================

/// One untyped data row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based data row number, used in error reports.
    pub row: usize,
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn new(row: usize) -> Self {
        RawRow {
            row,
            cells: HashMap::new(),
        }
    }

    /// Builder-style cell insertion.
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: &str) {
        self.cells.insert(column.to_string(), value.to_string());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

// ============================================================================
// LOAD POLICY
// ============================================================================

/// What to do with a row whose numeric field does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// The first bad row aborts the whole load.
    #[default]
    Reject,
    /// Bad rows are excluded and reported in the `LoadReport`.
    Skip,
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub loaded: usize,
    pub skipped: Vec<ParseError>,
}

// ============================================================================
// RECORD STORE
// ============================================================================

/// Ordered, read-only sequence of records. Positions are stable for the
/// lifetime of the store and are what dimensions index by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore<T = WineReview> {
    records: Vec<T>,
}

impl<T> RecordStore<T> {
    pub fn from_records(records: Vec<T>) -> Self {
        RecordStore { records }
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }
}

impl<'a, T> IntoIterator for &'a RecordStore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl RecordStore<WineReview> {
    /// Parses raw rows into a store.
    ///
    /// Under `ParsePolicy::Reject` the first row with a missing or
    /// non-numeric required field fails the load. Under `ParsePolicy::Skip`
    /// such rows are left out and listed in the report. A load that ends up
    /// with no records at all is `LoadError::Empty`.
    pub fn load<I>(rows: I, policy: ParsePolicy) -> Result<(Self, LoadReport), LoadError>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut report = LoadReport::default();
        let mut records = Vec::new();

        for row in rows {
            report.rows_read += 1;
            match parse_row(&row) {
                Ok(review) => records.push(review),
                Err(err) => match policy {
                    ParsePolicy::Reject => return Err(LoadError::Parse(err)),
                    ParsePolicy::Skip => {
                        log::warn!("skipping row: {}", err);
                        report.skipped.push(err);
                    }
                },
            }
        }

        if records.is_empty() {
            return Err(LoadError::Empty);
        }

        report.loaded = records.len();
        log::debug!(
            "loaded {} records ({} rows read, {} skipped)",
            report.loaded,
            report.rows_read,
            report.skipped.len()
        );

        Ok((RecordStore::from_records(records), report))
    }
}

// ============================================================================
// ROW PARSING
// ============================================================================

/// Converts one raw row into a typed record.
pub fn parse_row(row: &RawRow) -> Result<WineReview, ParseError> {
    let country = text_field(row, COUNTRY)?;
    let variety = text_field(row, VARIETY)?;

    let points_text = cell(row, POINTS)?;
    let points = parse_integer(points_text).map_err(|reason| ParseError {
        row: row.row,
        column: POINTS.to_string(),
        value: points_text.to_string(),
        reason,
    })?;

    let price_text = cell(row, PRICE)?;
    let price = if is_null(price_text) {
        None
    } else {
        Some(parse_integer(price_text).map_err(|reason| ParseError {
            row: row.row,
            column: PRICE.to_string(),
            value: price_text.to_string(),
            reason,
        })?)
    };

    Ok(WineReview {
        country,
        variety,
        points,
        price,
    })
}

fn cell<'a>(row: &'a RawRow, column: &str) -> Result<&'a str, ParseError> {
    row.get(column).ok_or_else(|| ParseError {
        row: row.row,
        column: column.to_string(),
        value: String::new(),
        reason: ParseFailure::Missing,
    })
}

fn text_field(row: &RawRow, column: &str) -> Result<String, ParseError> {
    Ok(cell(row, column)?.trim().to_string())
}

/// Markers exporters use for an absent optional number.
fn is_null(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("na")
}

/// Parses a trimmed integer. A decimal with a zero fraction ("30.0") is
/// accepted as well, since integer columns that contain nulls are commonly
/// exported as floats.
pub fn parse_integer(text: &str) -> Result<i64, ParseFailure> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseFailure::Missing);
    }

    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(value);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => {
            if value < i64::MIN as f64 || value > i64::MAX as f64 {
                Err(ParseFailure::OutOfRange)
            } else {
                Ok(value as i64)
            }
        }
        _ => Err(ParseFailure::NotNumeric),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: usize, country: &str, variety: &str, points: &str, price: &str) -> RawRow {
        RawRow::new(n)
            .with(COUNTRY, country)
            .with(VARIETY, variety)
            .with(POINTS, points)
            .with(PRICE, price)
    }

    #[test]
    fn test_parse_integer_forms() {
        assert_eq!(parse_integer("90"), Ok(90));
        assert_eq!(parse_integer("  87 "), Ok(87));
        assert_eq!(parse_integer("30.0"), Ok(30));
        assert_eq!(parse_integer("-4"), Ok(-4));
        assert_eq!(parse_integer("30.5"), Err(ParseFailure::NotNumeric));
        assert_eq!(parse_integer("ninety"), Err(ParseFailure::NotNumeric));
        assert_eq!(parse_integer("12abc"), Err(ParseFailure::NotNumeric));
        assert_eq!(parse_integer(""), Err(ParseFailure::Missing));
        assert_eq!(parse_integer("1e30"), Err(ParseFailure::OutOfRange));
    }

    #[test]
    fn test_parse_row_trims_text_and_allows_missing_price() {
        let review = parse_row(&row(1, " US ", "Malbec ", "90", "")).unwrap();
        assert_eq!(review, WineReview::new("US", "Malbec", 90, None));

        let review = parse_row(&row(2, "FR", "Syrah", "88", "NaN")).unwrap();
        assert_eq!(review.price, None);
    }

    #[test]
    fn test_missing_points_is_an_error() {
        let err = parse_row(&row(7, "US", "Malbec", " ", "20")).unwrap_err();
        assert_eq!(err.row, 7);
        assert_eq!(err.column, POINTS);
        assert_eq!(err.reason, ParseFailure::Missing);
    }

    #[test]
    fn test_absent_column_is_an_error() {
        let raw = RawRow::new(3).with(COUNTRY, "US").with(VARIETY, "Malbec").with(POINTS, "90");
        let err = parse_row(&raw).unwrap_err();
        assert_eq!(err.column, PRICE);
        assert_eq!(err.reason, ParseFailure::Missing);
    }

    #[test]
    fn test_reject_policy_stops_at_first_bad_row() {
        let rows = vec![
            row(1, "US", "Malbec", "90", "30"),
            row(2, "US", "Malbec", "good", "30"),
            row(3, "US", "Malbec", "85", "abc"),
        ];
        match RecordStore::load(rows, ParsePolicy::Reject) {
            Err(LoadError::Parse(err)) => {
                assert_eq!(err.row, 2);
                assert_eq!(err.value, "good");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_skip_policy_excludes_bad_rows() {
        let rows = vec![
            row(1, "US", "Malbec", "90", "30"),
            row(2, "US", "Malbec", "good", "30"),
            row(3, "FR", "Syrah", "85", "abc"),
            row(4, "FR", "Syrah", "92", ""),
        ];
        let (store, report) = RecordStore::load(rows, ParsePolicy::Skip).unwrap();
        assert_eq!(store.size(), 2);
        assert_eq!(report.rows_read, 4);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[1].column, PRICE);
        assert_eq!(store.get(1).map(|r| r.points), Some(92));
    }

    #[test]
    fn test_load_with_no_records_is_empty_error() {
        let rows = vec![row(1, "US", "Malbec", "x", "30")];
        assert!(matches!(
            RecordStore::load(rows, ParsePolicy::Skip),
            Err(LoadError::Empty)
        ));
        assert!(matches!(
            RecordStore::load(Vec::new(), ParsePolicy::Reject),
            Err(LoadError::Empty)
        ));
    }
}
