//! FILENAME: core/crossfilter/src/filter.rs
//! Filters attached to a dimension.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::key::Key;

/// The predicate a dimension applies to its keys. Initially `All`.
#[derive(Clone, Default)]
pub enum Filter {
    #[default]
    All,
    Exact(Key),
    /// Multi-select: any of the listed keys.
    In(SmallVec<[Key; 4]>),
    /// Half-open range `[lo, hi)` under the natural key ordering.
    Range { lo: Key, hi: Key },
    Predicate(Rc<dyn Fn(&Key) -> bool>),
}

impl Filter {
    pub fn exact(key: impl Into<Key>) -> Self {
        Filter::Exact(key.into())
    }

    pub fn any_of<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = Key>,
    {
        Filter::In(keys.into_iter().collect())
    }

    pub fn range(lo: impl Into<Key>, hi: impl Into<Key>) -> Self {
        Filter::Range {
            lo: lo.into(),
            hi: hi.into(),
        }
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Key) -> bool + 'static,
    {
        Filter::Predicate(Rc::new(f))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    pub fn accepts(&self, key: &Key) -> bool {
        match self {
            Filter::All => true,
            Filter::Exact(expected) => key == expected,
            Filter::In(keys) => keys.contains(key),
            Filter::Range { lo, hi } => key >= lo && key < hi,
            Filter::Predicate(f) => f(key),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("All"),
            Filter::Exact(key) => f.debug_tuple("Exact").field(key).finish(),
            Filter::In(keys) => f.debug_tuple("In").field(keys).finish(),
            Filter::Range { lo, hi } => f
                .debug_struct("Range")
                .field("lo", lo)
                .field("hi", hi)
                .finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Predicates compare by identity.
impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Filter::All, Filter::All) => true,
            (Filter::Exact(a), Filter::Exact(b)) => a == b,
            (Filter::In(a), Filter::In(b)) => a == b,
            (Filter::Range { lo: la, hi: ha }, Filter::Range { lo: lb, hi: hb }) => {
                la == lb && ha == hb
            }
            (Filter::Predicate(a), Filter::Predicate(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Exact(key) => write!(f, "{}", key),
            Filter::In(keys) => {
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", key)?;
                }
                Ok(())
            }
            Filter::Range { lo, hi } => write!(f, "[{}, {})", lo, hi),
            Filter::Predicate(_) => f.write_str("custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_half_open() {
        let filter = Filter::range(10i64, 20i64);
        assert!(filter.accepts(&Key::Number(10)));
        assert!(filter.accepts(&Key::Number(19)));
        assert!(!filter.accepts(&Key::Number(20)));
        assert!(!filter.accepts(&Key::Undefined));
    }

    #[test]
    fn test_any_of() {
        let filter = Filter::any_of(vec![Key::text("US"), Key::text("Chile")]);
        assert!(filter.accepts(&Key::text("Chile")));
        assert!(!filter.accepts(&Key::text("France")));
        assert_eq!(filter.to_string(), "US | Chile");
    }

    #[test]
    fn test_predicate_identity_equality() {
        let a = Filter::predicate(|k| k.as_number().is_some_and(|n| n > 90));
        let b = a.clone();
        let c = Filter::predicate(|k| k.as_number().is_some_and(|n| n > 90));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.accepts(&Key::Number(95)));
    }
}
