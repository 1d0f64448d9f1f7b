//! FILENAME: core/crossfilter/src/index.rs
//! The cross-filter index.
//!
//! The index owns the record store, every dimension and every group. For
//! each record it keeps a bitmask of the dimensions whose filter rejects it.
//! A record is visible to a group on dimension D when that mask is zero once
//! D's own bit is ignored: a group sees the intersection of every *other*
//! dimension's filter.
//!
//! A filter change only touches the records whose bit for the changed
//! dimension flipped, and for each of them only the groups whose visibility
//! flipped. Groups are scanned in full exactly once, when they are created.

use std::cmp::Ordering;
use std::collections::VecDeque;

use serde::Serialize;

use records::RecordStore;

use crate::dimension::{Dimension, DimensionId, ValueId};
use crate::error::{CrossfilterError, KeyError};
use crate::filter::Filter;
use crate::group::{Group, GroupEntry, GroupHandle, GroupId, GroupSlot};
use crate::key::Key;
use crate::reducer::Reducer;

/// One bit per dimension in the rejection mask.
pub const MAX_DIMENSIONS: usize = 64;

/// Follow-up filter changes a single `set_filter` call may trigger through
/// listeners.
pub const MAX_CASCADE: usize = 16;

// ============================================================================
// CHANGE NOTIFICATION
// ============================================================================

/// Summary of one applied filter change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterChange {
    /// Records whose verdict under the changed dimension flipped.
    pub flipped: usize,
    /// Records that now pass every filter and did not before.
    pub entered: usize,
    /// Records that passed every filter and no longer do.
    pub left: usize,
}

#[derive(Debug, Clone)]
pub struct FilterEvent {
    pub dimension: DimensionId,
    pub filter: Filter,
    pub change: FilterChange,
}

/// Filter changes requested by listeners. They are applied in order once
/// the change being reported has fully completed.
#[derive(Debug, Default)]
pub struct FilterQueue {
    pending: VecDeque<(DimensionId, Filter)>,
}

impl FilterQueue {
    pub fn push(&mut self, dimension: DimensionId, filter: Filter) {
        self.pending.push_back((dimension, filter));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn pop(&mut self) -> Option<(DimensionId, Filter)> {
        self.pending.pop_front()
    }
}

type Listener = Box<dyn FnMut(&FilterEvent, &mut FilterQueue)>;

/// One accumulator update made while applying a filter change.
struct GroupDelta {
    group: usize,
    value_id: ValueId,
    record: usize,
    added: bool,
}

// ============================================================================
// INDEX
// ============================================================================

pub struct Crossfilter<T> {
    store: RecordStore<T>,
    dimensions: Vec<Dimension>,
    groups: Vec<Box<dyn GroupSlot<T>>>,
    /// Per record: bit d is set when dimension d rejects the record.
    rejected: Vec<u64>,
    /// Records passing every filter.
    visible: usize,
    listeners: Vec<Listener>,
}

impl<T: 'static> Crossfilter<T> {
    /// Builds an index over a fully loaded store.
    pub fn new(store: RecordStore<T>) -> Self {
        let size = store.size();
        Crossfilter {
            store,
            dimensions: Vec::new(),
            groups: Vec::new(),
            rejected: vec![0; size],
            visible: size,
            listeners: Vec::new(),
        }
    }

    pub fn store(&self) -> &RecordStore<T> {
        &self.store
    }

    pub fn size(&self) -> usize {
        self.store.size()
    }

    // ------------------------------------------------------------------------
    // Dimensions
    // ------------------------------------------------------------------------

    /// Creates a dimension. The key function runs over every record right
    /// away; the first failure is a configuration error and no dimension is
    /// added.
    pub fn add_dimension<F>(&mut self, name: &str, key_fn: F) -> Result<DimensionId, CrossfilterError>
    where
        F: Fn(&T) -> Result<Key, KeyError>,
    {
        if self.dimensions.len() >= MAX_DIMENSIONS {
            return Err(CrossfilterError::TooManyDimensions { max: MAX_DIMENSIONS });
        }

        let mut keys = Vec::with_capacity(self.store.size());
        for (index, record) in self.store.iter().enumerate() {
            let key = key_fn(record).map_err(|source| CrossfilterError::Configuration {
                dimension: name.to_string(),
                record: index,
                source,
            })?;
            keys.push(key);
        }

        let id = DimensionId(self.dimensions.len());
        let dimension = Dimension::build(id, name.to_string(), keys);
        log::debug!(
            "dimension '{}' created over {} records with {} keys",
            name,
            self.store.size(),
            dimension.dictionary().len()
        );
        self.dimensions.push(dimension);
        Ok(id)
    }

    pub fn dimension(&self, id: DimensionId) -> Result<&Dimension, CrossfilterError> {
        self.dimensions
            .get(id.0)
            .ok_or(CrossfilterError::UnknownDimension(id.0))
    }

    pub fn dimension_by_name(&self, name: &str) -> Option<DimensionId> {
        self.dimensions
            .iter()
            .find(|d| d.name() == name)
            .map(Dimension::id)
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Whether a record passes one dimension's filter, ignoring all others.
    pub fn active(&self, dimension: DimensionId, record: usize) -> Result<bool, CrossfilterError> {
        self.dimension(dimension)?
            .active(record)
            .ok_or(CrossfilterError::UnknownRecord(record))
    }

    // ------------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------------

    /// Creates a group on a dimension and fills it from the records visible
    /// to it under the current filters.
    pub fn add_group<R>(&mut self, dimension: DimensionId, reducer: R) -> Result<GroupHandle<R>, CrossfilterError>
    where
        R: Reducer<T> + 'static,
        R::Value: 'static,
    {
        let dim = self.dimension(dimension)?;
        let mut group = Group::new(dimension, reducer, dim.dictionary().len());

        let own = dimension.bit();
        for (index, record) in self.store.iter().enumerate() {
            if self.rejected[index] & !own == 0 {
                group.add(dim.value_id(index), record);
            }
        }

        let id = GroupId(self.groups.len());
        log::debug!("group {} created on dimension '{}'", id.0, dim.name());
        self.groups.push(Box::new(group));
        Ok(GroupHandle::new(id, dimension))
    }

    fn group<R>(&self, handle: &GroupHandle<R>) -> Result<&Group<T, R>, CrossfilterError>
    where
        R: Reducer<T> + 'static,
        R::Value: 'static,
    {
        self.groups
            .get(handle.id.0)
            .filter(|slot| slot.dimension() == handle.dimension)
            .and_then(|slot| slot.as_any().downcast_ref::<Group<T, R>>())
            .ok_or(CrossfilterError::UnknownGroup(handle.id.0))
    }

    /// Current entries of a group in natural key order.
    pub fn snapshot<R>(&self, handle: &GroupHandle<R>) -> Result<Vec<GroupEntry<R::Value>>, CrossfilterError>
    where
        R: Reducer<T> + 'static,
        R::Value: 'static,
    {
        let group = self.group(handle)?;
        let dim = self.dimension(handle.dimension)?;
        Ok(group.snapshot(dim.dictionary()))
    }

    /// Current entries of a group in a caller-chosen order. Entries that
    /// compare equal keep the order in which their keys were first seen.
    pub fn snapshot_by<R, F>(
        &self,
        handle: &GroupHandle<R>,
        compare: F,
    ) -> Result<Vec<GroupEntry<R::Value>>, CrossfilterError>
    where
        R: Reducer<T> + 'static,
        R::Value: 'static,
        F: FnMut(&GroupEntry<R::Value>, &GroupEntry<R::Value>) -> Ordering,
    {
        let group = self.group(handle)?;
        let dim = self.dimension(handle.dimension)?;
        Ok(group.snapshot_by(dim.dictionary(), compare))
    }

    /// The accumulator for one key, if the dimension has that key.
    pub fn value<R>(&self, handle: &GroupHandle<R>, key: &Key) -> Result<Option<&R::Value>, CrossfilterError>
    where
        R: Reducer<T> + 'static,
        R::Value: 'static,
    {
        let group = self.group(handle)?;
        let dim = self.dimension(handle.dimension)?;
        Ok(dim.dictionary().id_of(key).map(|id| group.value(id)))
    }

    /// Recomputes a group's entries from scratch over the records currently
    /// visible to it. Used to verify the incremental path.
    pub fn rebuild_snapshot<R>(&self, handle: &GroupHandle<R>) -> Result<Vec<GroupEntry<R::Value>>, CrossfilterError>
    where
        R: Reducer<T> + 'static,
        R::Value: 'static,
    {
        let group = self.group(handle)?;
        let dim = self.dimension(handle.dimension)?;
        let reducer = group.reducer();

        let mut values: Vec<R::Value> = (0..dim.dictionary().len()).map(|_| reducer.initial()).collect();
        let own = handle.dimension.bit();
        for (index, record) in self.store.iter().enumerate() {
            if self.rejected[index] & !own == 0 {
                reducer.add(&mut values[dim.value_id(index) as usize], record);
            }
        }

        let keys = dim.dictionary();
        Ok(keys
            .sorted_ids()
            .iter()
            .map(|&id| GroupEntry {
                key: keys.key(id).clone(),
                value: values[id as usize].clone(),
            })
            .collect())
    }

    // ------------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------------

    /// Replaces a dimension's filter and brings every group up to date before
    /// returning. Listeners run afterwards; any changes they queue are
    /// applied in order, each one completing before the next.
    pub fn set_filter(&mut self, dimension: DimensionId, filter: Filter) -> Result<FilterChange, CrossfilterError> {
        let mut queue = FilterQueue::default();
        let change = self.apply_filter(dimension, filter, &mut queue)?;

        let mut cascaded = 0;
        while let Some((next_dimension, next_filter)) = queue.pop() {
            cascaded += 1;
            if cascaded > MAX_CASCADE {
                log::error!("filter cascade exceeded {} changes, dropping the rest", MAX_CASCADE);
                return Err(CrossfilterError::CascadeLimit(MAX_CASCADE));
            }
            self.apply_filter(next_dimension, next_filter, &mut queue)?;
        }

        Ok(change)
    }

    pub fn clear_filter(&mut self, dimension: DimensionId) -> Result<FilterChange, CrossfilterError> {
        self.set_filter(dimension, Filter::All)
    }

    pub fn clear_all_filters(&mut self) -> Result<(), CrossfilterError> {
        for index in 0..self.dimensions.len() {
            if !self.dimensions[index].filter().is_all() {
                self.set_filter(DimensionId(index), Filter::All)?;
            }
        }
        Ok(())
    }

    fn apply_filter(
        &mut self,
        dimension: DimensionId,
        filter: Filter,
        queue: &mut FilterQueue,
    ) -> Result<FilterChange, CrossfilterError> {
        let dim = self
            .dimensions
            .get_mut(dimension.0)
            .ok_or(CrossfilterError::UnknownDimension(dimension.0))?;
        let previous = dim.filter().clone();
        let flipped = dim.replace_filter(filter.clone());

        let bit = dimension.bit();
        let mut change = FilterChange {
            flipped: flipped.len(),
            ..FilterChange::default()
        };
        let mut applied: Vec<GroupDelta> = Vec::new();

        for (position, &record_index) in flipped.iter().enumerate() {
            let before = self.rejected[record_index];
            let after = before ^ bit;
            self.rejected[record_index] = after;
            let record = &self.store.records()[record_index];

            let mut failure = None;
            for (group_index, group) in self.groups.iter_mut().enumerate() {
                let owner = group.dimension();
                let was_visible = before & !owner.bit() == 0;
                let now_visible = after & !owner.bit() == 0;
                if was_visible == now_visible {
                    continue;
                }

                let owner_dim = &self.dimensions[owner.0];
                let value_id = owner_dim.value_id(record_index);
                if now_visible {
                    group.add(value_id, record);
                } else if let Err(detail) = group.remove(value_id, record) {
                    let key = owner_dim.dictionary().key(value_id).to_string();
                    log::error!("group {} key '{}': {}", group_index, key, detail);
                    failure = Some(CrossfilterError::InvariantViolation {
                        group: group_index,
                        key,
                        detail,
                    });
                    break;
                }
                applied.push(GroupDelta {
                    group: group_index,
                    value_id,
                    record: record_index,
                    added: now_visible,
                });
            }

            if let Some(error) = failure {
                self.roll_back(dimension, previous, &flipped[..=position], &applied);
                return Err(error);
            }

            if before == 0 && after != 0 {
                change.left += 1;
            } else if before != 0 && after == 0 {
                change.entered += 1;
            }
        }

        self.visible = self.visible + change.entered - change.left;
        log::debug!(
            "filter on '{}' set to {}: {} flipped, {} entered, {} left, {} visible",
            self.dimensions[dimension.0].name(),
            filter,
            change.flipped,
            change.entered,
            change.left,
            self.visible
        );

        let event = FilterEvent {
            dimension,
            filter,
            change,
        };
        for listener in self.listeners.iter_mut() {
            listener(&event, queue);
        }

        Ok(change)
    }

    /// Undoes a partially applied filter change: group deltas in reverse,
    /// then the rejection bits of the touched records, then the filter.
    fn roll_back(&mut self, dimension: DimensionId, previous: Filter, touched: &[usize], applied: &[GroupDelta]) {
        for delta in applied.iter().rev() {
            let record = &self.store.records()[delta.record];
            let group = &mut self.groups[delta.group];
            if !delta.added {
                group.add(delta.value_id, record);
            } else if let Err(detail) = group.remove(delta.value_id, record) {
                log::error!("group {} could not be rolled back: {}", delta.group, detail);
            }
        }

        let bit = dimension.bit();
        for &record_index in touched {
            self.rejected[record_index] ^= bit;
        }
        self.dimensions[dimension.0].replace_filter(previous);
        log::warn!(
            "filter change on '{}' rolled back after {} group updates",
            self.dimensions[dimension.0].name(),
            applied.len()
        );
    }

    /// Registers a listener called after every applied filter change.
    /// Listeners cannot touch the index directly; they request follow-up
    /// changes through the queue.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&FilterEvent, &mut FilterQueue) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ------------------------------------------------------------------------
    // Filtered records
    // ------------------------------------------------------------------------

    /// Whether a record passes every dimension's filter.
    pub fn is_visible(&self, record: usize) -> bool {
        self.rejected.get(record).is_some_and(|&mask| mask == 0)
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn visible_records(&self) -> impl Iterator<Item = (usize, &T)> {
        self.store
            .iter()
            .enumerate()
            .filter(|(index, _)| self.rejected[*index] == 0)
    }

    /// Up to `n` visible records with the greatest keys on a dimension,
    /// greatest first. Records whose key is undefined are skipped.
    pub fn top(&self, dimension: DimensionId, n: usize) -> Result<Vec<&T>, CrossfilterError> {
        let dim = self.dimension(dimension)?;
        Ok(self.ranked(dim, dim.sorted_records().iter().rev(), n))
    }

    /// Up to `n` visible records with the smallest keys on a dimension,
    /// smallest first. Records whose key is undefined are skipped.
    pub fn bottom(&self, dimension: DimensionId, n: usize) -> Result<Vec<&T>, CrossfilterError> {
        let dim = self.dimension(dimension)?;
        Ok(self.ranked(dim, dim.sorted_records().iter(), n))
    }

    fn ranked<'a, I>(&'a self, dim: &Dimension, order: I, n: usize) -> Vec<&'a T>
    where
        I: Iterator<Item = &'a u32>,
    {
        order
            .map(|&record| record as usize)
            .filter(|&record| self.rejected[record] == 0)
            .filter(|&record| dim.key_of(record).is_some_and(|key| !key.is_undefined()))
            .take(n)
            .map(|record| &self.store.records()[record])
            .collect()
    }
}
