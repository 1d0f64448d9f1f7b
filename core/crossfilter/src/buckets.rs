//! FILENAME: core/crossfilter/src/buckets.rs
//! Bucketing: mapping an integer field onto a fixed, ordered set of labels.
//!
//! Buckets are inclusive on both ends and must be contiguous, so every value
//! between the first lower bound and the last upper bound lands in exactly
//! one bucket. The last bucket may be open-ended. Values outside every
//! bucket, and missing values, map to `Key::Undefined`.

use serde::Serialize;

use crate::error::CrossfilterError;
use crate::key::{Key, UNDEFINED_LABEL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub lo: i64,
    /// Inclusive upper bound; `None` means unbounded.
    pub hi: Option<i64>,
}

impl Bucket {
    pub fn new(label: &str, lo: i64, hi: Option<i64>) -> Self {
        Bucket {
            label: label.to_string(),
            lo,
            hi,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.lo && self.hi.map_or(true, |hi| value <= hi)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Buckets {
    buckets: Vec<Bucket>,
}

impl Buckets {
    /// Validates and builds a bucket list.
    pub fn new(buckets: Vec<Bucket>) -> Result<Self, CrossfilterError> {
        if buckets.is_empty() {
            return Err(CrossfilterError::InvalidBuckets("no buckets".to_string()));
        }
        if buckets.len() > u16::MAX as usize {
            return Err(CrossfilterError::InvalidBuckets("too many buckets".to_string()));
        }

        for (i, bucket) in buckets.iter().enumerate() {
            if bucket.label == UNDEFINED_LABEL
                || buckets[..i].iter().any(|b| b.label == bucket.label)
            {
                return Err(CrossfilterError::InvalidBuckets(format!(
                    "duplicate or reserved label '{}'",
                    bucket.label
                )));
            }

            match bucket.hi {
                Some(hi) if hi < bucket.lo => {
                    return Err(CrossfilterError::InvalidBuckets(format!(
                        "'{}' has upper bound {} below lower bound {}",
                        bucket.label, hi, bucket.lo
                    )));
                }
                None if i + 1 != buckets.len() => {
                    return Err(CrossfilterError::InvalidBuckets(format!(
                        "only the last bucket may be open-ended, not '{}'",
                        bucket.label
                    )));
                }
                _ => {}
            }

            if let Some(next) = buckets.get(i + 1) {
                let expected = bucket.hi.and_then(|hi| hi.checked_add(1));
                if expected != Some(next.lo) {
                    return Err(CrossfilterError::InvalidBuckets(format!(
                        "'{}' does not start right after '{}'",
                        next.label, bucket.label
                    )));
                }
            }
        }

        Ok(Buckets { buckets })
    }

    /// Builds a list already known to be valid.
    fn fixed(spec: &[(&str, i64, Option<i64>)]) -> Self {
        Buckets {
            buckets: spec
                .iter()
                .map(|&(label, lo, hi)| Bucket::new(label, lo, hi))
                .collect(),
        }
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn classify(&self, value: Option<i64>) -> Key {
        let Some(value) = value else {
            return Key::Undefined;
        };
        self.buckets
            .iter()
            .position(|bucket| bucket.contains(value))
            .map_or(Key::Undefined, |rank| self.key_at(rank))
    }

    fn key_at(&self, rank: usize) -> Key {
        Key::Bucket {
            rank: rank as u16,
            label: self.buckets[rank].label.clone(),
        }
    }

    /// All keys in bucket order, followed by `Undefined`.
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = (0..self.buckets.len()).map(|rank| self.key_at(rank)).collect();
        keys.push(Key::Undefined);
        keys
    }

    /// Maps a label (as shown by a selector) back to its key.
    pub fn key_for_label(&self, label: &str) -> Option<Key> {
        if label == UNDEFINED_LABEL {
            return Some(Key::Undefined);
        }
        self.buckets
            .iter()
            .position(|bucket| bucket.label == label)
            .map(|rank| self.key_at(rank))
    }
}

/// Review score bands.
pub fn points_buckets() -> Buckets {
    Buckets::fixed(&[
        ("Bad: Below 83", 0, Some(82)),
        ("Average: 83 to 87", 83, Some(87)),
        ("Good: 88 to 91", 88, Some(91)),
        ("Very Good: 92 to 95", 92, Some(95)),
        ("Excellent: Above 95", 96, None),
    ])
}

/// Bottle price bands.
pub fn price_buckets() -> Buckets {
    Buckets::fixed(&[
        ("$1 to $25", 0, Some(25)),
        ("$25 to $50", 26, Some(50)),
        ("$50 to $75", 51, Some(75)),
        ("$75 to $100", 76, Some(100)),
        ("Above $100", 101, None),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_lists_pass_validation() {
        for buckets in [points_buckets(), price_buckets()] {
            let validated = Buckets::new(buckets.buckets().to_vec());
            assert!(validated.is_ok());
        }
    }

    #[test]
    fn test_points_boundaries() {
        let buckets = points_buckets();
        let label = |v: i64| buckets.classify(Some(v)).to_string();
        assert_eq!(label(0), "Bad: Below 83");
        assert_eq!(label(82), "Bad: Below 83");
        assert_eq!(label(83), "Average: 83 to 87");
        assert_eq!(label(87), "Average: 83 to 87");
        assert_eq!(label(88), "Good: 88 to 91");
        assert_eq!(label(95), "Very Good: 92 to 95");
        assert_eq!(label(96), "Excellent: Above 95");
        assert_eq!(label(100), "Excellent: Above 95");
        assert_eq!(label(250), "Excellent: Above 95");
    }

    #[test]
    fn test_missing_and_negative_are_undefined() {
        let buckets = price_buckets();
        assert_eq!(buckets.classify(None), Key::Undefined);
        assert_eq!(buckets.classify(Some(-1)), Key::Undefined);
        assert_eq!(buckets.classify(Some(101)).to_string(), "Above $100");
    }

    #[test]
    fn test_validation_rejects_gaps_and_overlaps() {
        let gap = vec![Bucket::new("a", 0, Some(10)), Bucket::new("b", 12, None)];
        assert!(Buckets::new(gap).is_err());

        let overlap = vec![Bucket::new("a", 0, Some(10)), Bucket::new("b", 10, None)];
        assert!(Buckets::new(overlap).is_err());

        let open_middle = vec![Bucket::new("a", 0, None), Bucket::new("b", 10, Some(20))];
        assert!(Buckets::new(open_middle).is_err());

        let reserved = vec![Bucket::new("Unknown", 0, None)];
        assert!(Buckets::new(reserved).is_err());
    }

    #[test]
    fn test_label_round_trip() {
        let buckets = price_buckets();
        for key in buckets.keys() {
            assert_eq!(buckets.key_for_label(&key.to_string()), Some(key));
        }
        assert_eq!(buckets.key_for_label("Free"), None);
    }
}
