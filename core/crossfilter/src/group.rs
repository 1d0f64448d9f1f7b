//! FILENAME: core/crossfilter/src/group.rs
//! Groups - per-key accumulators tied to one dimension.
//!
//! Groups are passive: they hold a reducer and one accumulator per distinct
//! key of their dimension. Only the index decides which records are folded
//! in or out.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

use crate::dimension::{DimensionId, KeyDictionary, ValueId};
use crate::error::Underflow;
use crate::key::Key;
use crate::reducer::Reducer;

/// Position of a group within its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One row of a group snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry<V> {
    pub key: Key,
    pub value: V,
}

/// Typed reference to a group owned by an index.
pub struct GroupHandle<R> {
    pub(crate) id: GroupId,
    pub(crate) dimension: DimensionId,
    _reducer: PhantomData<fn() -> R>,
}

impl<R> GroupHandle<R> {
    pub(crate) fn new(id: GroupId, dimension: DimensionId) -> Self {
        GroupHandle {
            id,
            dimension,
            _reducer: PhantomData,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn dimension(&self) -> DimensionId {
        self.dimension
    }
}

impl<R> Clone for GroupHandle<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for GroupHandle<R> {}

impl<R> fmt::Debug for GroupHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupHandle")
            .field("id", &self.id)
            .field("dimension", &self.dimension)
            .finish()
    }
}

// ============================================================================
// GROUP
// ============================================================================

pub(crate) struct Group<T, R: Reducer<T>> {
    dimension: DimensionId,
    reducer: R,
    /// Accumulator per `ValueId` of the dimension's dictionary.
    values: Vec<R::Value>,
    _record: PhantomData<fn(&T)>,
}

impl<T, R: Reducer<T>> Group<T, R> {
    pub(crate) fn new(dimension: DimensionId, reducer: R, key_count: usize) -> Self {
        let values = (0..key_count).map(|_| reducer.initial()).collect();
        Group {
            dimension,
            reducer,
            values,
            _record: PhantomData,
        }
    }

    pub(crate) fn reducer(&self) -> &R {
        &self.reducer
    }

    pub(crate) fn value(&self, id: ValueId) -> &R::Value {
        &self.values[id as usize]
    }

    /// Entries in key order.
    pub(crate) fn snapshot(&self, keys: &KeyDictionary) -> Vec<GroupEntry<R::Value>> {
        keys.sorted_ids()
            .iter()
            .map(|&id| GroupEntry {
                key: keys.key(id).clone(),
                value: self.values[id as usize].clone(),
            })
            .collect()
    }

    /// Entries ordered by `compare`, ties in first-seen key order.
    pub(crate) fn snapshot_by<F>(&self, keys: &KeyDictionary, mut compare: F) -> Vec<GroupEntry<R::Value>>
    where
        F: FnMut(&GroupEntry<R::Value>, &GroupEntry<R::Value>) -> Ordering,
    {
        let mut entries: Vec<GroupEntry<R::Value>> = keys
            .ids()
            .map(|id| GroupEntry {
                key: keys.key(id).clone(),
                value: self.values[id as usize].clone(),
            })
            .collect();
        entries.sort_by(|a, b| compare(a, b));
        entries
    }
}

/// Object-safe view of a group, so an index can hold groups with different
/// reducers side by side.
pub(crate) trait GroupSlot<T> {
    fn dimension(&self) -> DimensionId;

    fn add(&mut self, id: ValueId, record: &T);

    fn remove(&mut self, id: ValueId, record: &T) -> Result<(), Underflow>;

    fn as_any(&self) -> &dyn Any;
}

impl<T, R> GroupSlot<T> for Group<T, R>
where
    T: 'static,
    R: Reducer<T> + 'static,
    R::Value: 'static,
{
    fn dimension(&self) -> DimensionId {
        self.dimension
    }

    fn add(&mut self, id: ValueId, record: &T) {
        self.reducer.add(&mut self.values[id as usize], record);
    }

    fn remove(&mut self, id: ValueId, record: &T) -> Result<(), Underflow> {
        self.reducer.remove(&mut self.values[id as usize], record)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
