//! FILENAME: core/crossfilter/src/key.rs
//! Dimension keys.
//!
//! A key is what a dimension extracts from a record: a number, a piece of
//! text, a bucket label, a tuple of keys, or the `Undefined` sentinel for
//! records that have no meaningful key (missing price, value outside every
//! bucket, empty text).

use std::cmp::Ordering;
use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// Label shown for `Key::Undefined`.
pub const UNDEFINED_LABEL: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Number(i64),
    Text(String),
    /// A labelled range. `rank` is the bucket's position in its ordered list.
    Bucket { rank: u16, label: String },
    Tuple(Vec<Key>),
    Undefined,
}

impl Key {
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            Key::Undefined
        } else {
            Key::Text(value.to_string())
        }
    }

    pub fn pair(first: impl Into<Key>, second: impl Into<Key>) -> Self {
        Key::Tuple(vec![first.into(), second.into()])
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Key::Undefined)
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Key::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Variant order used by `Ord`; `Undefined` always sorts last.
    fn variant_rank(&self) -> u8 {
        match self {
            Key::Number(_) => 0,
            Key::Text(_) => 1,
            Key::Bucket { .. } => 2,
            Key::Tuple(_) => 3,
            Key::Undefined => 4,
        }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Number(a), Key::Number(b)) => a.cmp(b),
            (Key::Text(a), Key::Text(b)) => a.cmp(b),
            (
                Key::Bucket { rank: ra, label: la },
                Key::Bucket { rank: rb, label: lb },
            ) => ra.cmp(rb).then_with(|| la.cmp(lb)),
            (Key::Tuple(a), Key::Tuple(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Number(n) => write!(f, "{}", n),
            Key::Text(s) => f.write_str(s),
            Key::Bucket { label, .. } => f.write_str(label),
            Key::Tuple(parts) => {
                f.write_str("(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                f.write_str(")")
            }
            Key::Undefined => f.write_str(UNDEFINED_LABEL),
        }
    }
}

/// Keys serialize the way a chart consumes them: numbers as numbers, text
/// and buckets as strings, tuples as arrays, `Undefined` as null.
impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Key::Number(n) => serializer.serialize_i64(*n),
            Key::Text(s) => serializer.serialize_str(s),
            Key::Bucket { label, .. } => serializer.serialize_str(label),
            Key::Tuple(parts) => {
                let mut seq = serializer.serialize_seq(Some(parts.len()))?;
                for part in parts {
                    seq.serialize_element(part)?;
                }
                seq.end()
            }
            Key::Undefined => serializer.serialize_none(),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Number(value)
    }
}

impl From<Option<i64>> for Key {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Key::Undefined, Key::Number)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::text(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Key::Undefined
        } else {
            Key::Text(value)
        }
    }
}
