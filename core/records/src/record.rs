//! FILENAME: core/records/src/record.rs
//! PURPOSE: The wine review record and by-name field access.

use serde::{Deserialize, Serialize};

pub const COUNTRY: &str = "country";
pub const VARIETY: &str = "variety";
pub const POINTS: &str = "points";
pub const PRICE: &str = "price";

/// Columns a dataset must carry for a load to succeed.
pub const REQUIRED_COLUMNS: [&str; 4] = [COUNTRY, VARIETY, POINTS, PRICE];

/// One reviewed wine. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WineReview {
    pub country: String,
    pub variety: String,
    pub points: i64,
    pub price: Option<i64>,
}

impl WineReview {
    pub fn new(
        country: impl Into<String>,
        variety: impl Into<String>,
        points: i64,
        price: Option<i64>,
    ) -> Self {
        WineReview {
            country: country.into(),
            variety: variety.into(),
            points,
            price,
        }
    }
}

// ============================================================================
// BY-NAME FIELD ACCESS
// ============================================================================

/// A borrowed view of one field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
    Missing,
}

/// Field lookup by column name.
/// Returns `None` when the record type has no field with that name.
pub trait Fields {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl Fields for WineReview {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            COUNTRY => Some(FieldValue::Text(&self.country)),
            VARIETY => Some(FieldValue::Text(&self.variety)),
            POINTS => Some(FieldValue::Integer(self.points)),
            PRICE => Some(self.price.map_or(FieldValue::Missing, FieldValue::Integer)),
            _ => None,
        }
    }
}
