//! FILENAME: core/crossfilter/src/reducer.rs
//! Reducers - the accumulation logic behind a group.
//!
//! A reducer describes how one accumulator is created, how a record is
//! folded in, and how it is folded back out. `remove` must exactly undo a
//! previous `add` of the same record; the index relies on this to update
//! groups incrementally instead of rescanning.

use std::marker::PhantomData;

use serde::Serialize;

use crate::error::Underflow;

pub trait Reducer<T> {
    type Value: Clone + std::fmt::Debug + PartialEq;

    fn initial(&self) -> Self::Value;

    fn add(&self, acc: &mut Self::Value, record: &T);

    /// Fails when the accumulator holds nothing to remove.
    fn remove(&self, acc: &mut Self::Value, record: &T) -> Result<(), Underflow>;
}

const COUNT_UNDERFLOW: Underflow = Underflow("count would go negative");

// ============================================================================
// COUNT
// ============================================================================

/// Number of records per key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl<T> Reducer<T> for Count {
    type Value = u64;

    fn initial(&self) -> u64 {
        0
    }

    fn add(&self, acc: &mut u64, _record: &T) {
        *acc += 1;
    }

    fn remove(&self, acc: &mut u64, _record: &T) -> Result<(), Underflow> {
        *acc = acc.checked_sub(1).ok_or(COUNT_UNDERFLOW)?;
        Ok(())
    }
}

// ============================================================================
// SUM
// ============================================================================

/// Sum of an integer field per key.
pub struct Sum<T> {
    value: fn(&T) -> i64,
}

impl<T> Sum<T> {
    pub fn new(value: fn(&T) -> i64) -> Self {
        Sum { value }
    }
}

impl<T> Reducer<T> for Sum<T> {
    type Value = i64;

    fn initial(&self) -> i64 {
        0
    }

    fn add(&self, acc: &mut i64, record: &T) {
        *acc += (self.value)(record);
    }

    fn remove(&self, acc: &mut i64, record: &T) -> Result<(), Underflow> {
        *acc -= (self.value)(record);
        Ok(())
    }
}

// ============================================================================
// RUNNING AVERAGE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Average {
    pub count: u64,
    pub total: i64,
    pub average: f64,
}

/// Count, total and mean of an integer field per key.
pub struct RunningAverage<T> {
    value: fn(&T) -> i64,
}

impl<T> RunningAverage<T> {
    pub fn new(value: fn(&T) -> i64) -> Self {
        RunningAverage { value }
    }
}

impl<T> Reducer<T> for RunningAverage<T> {
    type Value = Average;

    fn initial(&self) -> Average {
        Average::default()
    }

    fn add(&self, acc: &mut Average, record: &T) {
        acc.count += 1;
        acc.total += (self.value)(record);
        acc.average = acc.total as f64 / acc.count as f64;
    }

    fn remove(&self, acc: &mut Average, record: &T) -> Result<(), Underflow> {
        acc.count = acc.count.checked_sub(1).ok_or(COUNT_UNDERFLOW)?;
        if acc.count == 0 {
            // Empty again; avoids 0/0.
            acc.total = 0;
            acc.average = 0.0;
        } else {
            acc.total -= (self.value)(record);
            acc.average = acc.total as f64 / acc.count as f64;
        }
        Ok(())
    }
}

// ============================================================================
// MATCH RATIO
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Ratio {
    pub total: u64,
    pub matched: u64,
}

impl Ratio {
    /// Share of matching records, 0 when the key is empty.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.matched as f64 / self.total as f64
        }
    }

    pub fn percent(&self) -> f64 {
        self.ratio() * 100.0
    }
}

/// Per key: how many records there are, and how many of them have a text
/// field equal to `target`.
pub struct MatchRatio<T> {
    target: String,
    field: fn(&T) -> &str,
}

impl<T> MatchRatio<T> {
    pub fn new(target: impl Into<String>, field: fn(&T) -> &str) -> Self {
        MatchRatio {
            target: target.into(),
            field,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn matches(&self, record: &T) -> bool {
        (self.field)(record) == self.target
    }
}

impl<T> Reducer<T> for MatchRatio<T> {
    type Value = Ratio;

    fn initial(&self) -> Ratio {
        Ratio::default()
    }

    fn add(&self, acc: &mut Ratio, record: &T) {
        acc.total += 1;
        if self.matches(record) {
            acc.matched += 1;
        }
    }

    fn remove(&self, acc: &mut Ratio, record: &T) -> Result<(), Underflow> {
        let total = acc.total.checked_sub(1).ok_or(COUNT_UNDERFLOW)?;
        let matched = if self.matches(record) {
            acc.matched
                .checked_sub(1)
                .ok_or(Underflow("match count would go negative"))?
        } else {
            acc.matched
        };
        acc.total = total;
        acc.matched = matched;
        Ok(())
    }
}

// ============================================================================
// AD-HOC REDUCERS
// ============================================================================

/// A reducer assembled from three plain functions.
pub struct ReduceFns<T, V> {
    pub initial: fn() -> V,
    pub add: fn(&mut V, &T),
    pub remove: fn(&mut V, &T) -> Result<(), Underflow>,
    _record: PhantomData<fn(&T)>,
}

impl<T, V> ReduceFns<T, V> {
    pub fn new(
        initial: fn() -> V,
        add: fn(&mut V, &T),
        remove: fn(&mut V, &T) -> Result<(), Underflow>,
    ) -> Self {
        ReduceFns {
            initial,
            add,
            remove,
            _record: PhantomData,
        }
    }
}

impl<T, V> Reducer<T> for ReduceFns<T, V>
where
    V: Clone + std::fmt::Debug + PartialEq,
{
    type Value = V;

    fn initial(&self) -> V {
        (self.initial)()
    }

    fn add(&self, acc: &mut V, record: &T) {
        (self.add)(acc, record)
    }

    fn remove(&self, acc: &mut V, record: &T) -> Result<(), Underflow> {
        (self.remove)(acc, record)
    }
}
