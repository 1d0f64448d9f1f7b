//! FILENAME: core/crossfilter/src/lib.rs
//! Cross-filter engine.
//!
//! Indexes a record store along several dimensions and keeps per-dimension
//! groups up to date as filters come and go. Depends on `records` only for
//! the store and by-name field access.
//!
//! Layers:
//! - `key` / `buckets`: what a dimension extracts from a record
//! - `filter`: what a dimension accepts
//! - `dimension`: keyed, filterable views
//! - `reducer` / `group`: per-key accumulation
//! - `index`: the `Crossfilter` that ties them together

pub mod buckets;
pub mod dimension;
pub mod error;
pub mod filter;
pub mod group;
pub mod index;
pub mod key;
pub mod reducer;

pub use buckets::{points_buckets, price_buckets, Bucket, Buckets};
pub use dimension::{pluck, pluck_bucketed, Dimension, DimensionId, KeyDictionary, ValueId};
pub use error::{CrossfilterError, KeyError, Underflow};
pub use filter::Filter;
pub use group::{GroupEntry, GroupHandle, GroupId};
pub use index::{Crossfilter, FilterChange, FilterEvent, FilterQueue, MAX_CASCADE, MAX_DIMENSIONS};
pub use key::{Key, UNDEFINED_LABEL};
pub use reducer::{Average, Count, MatchRatio, Ratio, ReduceFns, Reducer, RunningAverage, Sum};
