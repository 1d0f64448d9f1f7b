//! FILENAME: core/crossfilter/src/dimension.rs
//! Dimensions - keyed, filterable views over the record store.
//!
//! A dimension evaluates its key function once per record when it is
//! created. Keys are interned into a per-dimension dictionary so that groups
//! can keep their accumulators in a flat vector indexed by `ValueId`, and so
//! that a filter is evaluated once per distinct key rather than once per
//! record.

use rustc_hash::FxHashMap;

use records::{FieldValue, Fields};

use crate::buckets::Buckets;
use crate::error::KeyError;
use crate::filter::Filter;
use crate::key::Key;

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Reference to an interned key within one dimension's dictionary.
pub type ValueId = u32;

/// Position of a dimension within its index. Also its bit in the per-record
/// rejection mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(pub(crate) usize);

impl DimensionId {
    pub fn index(self) -> usize {
        self.0
    }

    pub(crate) fn bit(self) -> u64 {
        1u64 << self.0
    }
}

// ============================================================================
// KEY DICTIONARY
// ============================================================================

/// Distinct keys of one dimension, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct KeyDictionary {
    key_to_id: FxHashMap<Key, ValueId>,
    id_to_key: Vec<Key>,
    /// Ids ascending by key. Ties cannot occur (keys are unique), so this is
    /// also stable with respect to first-seen order.
    sorted_ids: Vec<ValueId>,
}

impl KeyDictionary {
    /// Interns a key and returns its id. Existing keys keep their id.
    pub fn intern(&mut self, key: Key) -> ValueId {
        if let Some(&id) = self.key_to_id.get(&key) {
            return id;
        }
        let id = self.id_to_key.len() as ValueId;
        self.id_to_key.push(key.clone());
        self.key_to_id.insert(key, id);
        id
    }

    pub fn id_of(&self, key: &Key) -> Option<ValueId> {
        self.key_to_id.get(key).copied()
    }

    pub fn key(&self, id: ValueId) -> &Key {
        &self.id_to_key[id as usize]
    }

    pub fn len(&self) -> usize {
        self.id_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_key.is_empty()
    }

    /// Ids in first-seen order.
    pub fn ids(&self) -> impl Iterator<Item = ValueId> {
        0..self.id_to_key.len() as ValueId
    }

    pub fn sorted_ids(&self) -> &[ValueId] {
        &self.sorted_ids
    }

    fn rebuild_sort_order(&mut self) {
        let keys = &self.id_to_key;
        let mut sorted: Vec<ValueId> = (0..keys.len() as ValueId).collect();
        sorted.sort_by(|&a, &b| keys[a as usize].cmp(&keys[b as usize]));
        self.sorted_ids = sorted;
    }
}

// ============================================================================
// DIMENSION
// ============================================================================

#[derive(Debug)]
pub struct Dimension {
    id: DimensionId,
    name: String,
    keys: KeyDictionary,
    /// Interned key of every record, by record position.
    record_keys: Vec<ValueId>,
    /// Record positions ascending by key, ties in record order.
    sorted_records: Vec<u32>,
    filter: Filter,
    /// Filter verdict per distinct key.
    accepted: Vec<bool>,
}

impl Dimension {
    /// Builds a dimension from precomputed record keys.
    pub(crate) fn build(id: DimensionId, name: String, record_keys: Vec<Key>) -> Self {
        let mut keys = KeyDictionary::default();
        let ids: Vec<ValueId> = record_keys.into_iter().map(|key| keys.intern(key)).collect();
        keys.rebuild_sort_order();

        let mut rank = vec![0u32; keys.len()];
        for (position, &value_id) in keys.sorted_ids().iter().enumerate() {
            rank[value_id as usize] = position as u32;
        }
        let mut sorted_records: Vec<u32> = (0..ids.len() as u32).collect();
        sorted_records.sort_by_key(|&record| rank[ids[record as usize] as usize]);

        let accepted = vec![true; keys.len()];
        Dimension {
            id,
            name,
            keys,
            record_keys: ids,
            sorted_records,
            filter: Filter::All,
            accepted,
        }
    }

    pub fn id(&self) -> DimensionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn dictionary(&self) -> &KeyDictionary {
        &self.keys
    }

    /// Distinct keys in natural order.
    pub fn keys(&self) -> Vec<&Key> {
        self.keys.sorted_ids().iter().map(|&id| self.keys.key(id)).collect()
    }

    pub fn key_of(&self, record: usize) -> Option<&Key> {
        self.record_keys.get(record).map(|&id| self.keys.key(id))
    }

    pub(crate) fn value_id(&self, record: usize) -> ValueId {
        self.record_keys[record]
    }

    /// Whether the record passes this dimension's filter, ignoring every
    /// other dimension.
    pub fn active(&self, record: usize) -> Option<bool> {
        self.record_keys
            .get(record)
            .map(|&id| self.accepted[id as usize])
    }

    pub(crate) fn sorted_records(&self) -> &[u32] {
        &self.sorted_records
    }

    /// Installs a new filter and returns the records whose active bit
    /// flipped, in record order.
    pub(crate) fn replace_filter(&mut self, filter: Filter) -> Vec<usize> {
        let accepted: Vec<bool> = self
            .keys
            .ids()
            .map(|id| filter.accepts(self.keys.key(id)))
            .collect();
        self.filter = filter;

        let flipped_keys: Vec<bool> = accepted
            .iter()
            .zip(&self.accepted)
            .map(|(now, before)| now != before)
            .collect();
        self.accepted = accepted;

        if !flipped_keys.iter().any(|&f| f) {
            return Vec::new();
        }

        self.record_keys
            .iter()
            .enumerate()
            .filter(|(_, &id)| flipped_keys[id as usize])
            .map(|(record, _)| record)
            .collect()
    }
}

// ============================================================================
// KEY FUNCTIONS
// ============================================================================

/// Key function reading a named field. Empty text and missing values become
/// `Key::Undefined`; an unknown field name is an error.
pub fn pluck<T: Fields>(field: &str) -> impl Fn(&T) -> Result<Key, KeyError> {
    let field = field.to_string();
    move |record: &T| match record.field(&field) {
        Some(FieldValue::Text(text)) => Ok(Key::text(text)),
        Some(FieldValue::Integer(n)) => Ok(Key::Number(n)),
        Some(FieldValue::Missing) => Ok(Key::Undefined),
        None => Err(KeyError::UnknownField(field.clone())),
    }
}

/// Key function bucketing a named integer field.
pub fn pluck_bucketed<T: Fields>(
    field: &str,
    buckets: Buckets,
) -> impl Fn(&T) -> Result<Key, KeyError> {
    let field = field.to_string();
    move |record: &T| match record.field(&field) {
        Some(FieldValue::Integer(n)) => Ok(buckets.classify(Some(n))),
        Some(FieldValue::Missing) => Ok(buckets.classify(None)),
        Some(FieldValue::Text(_)) => Err(KeyError::Invalid(format!(
            "field '{}' is not numeric",
            field
        ))),
        None => Err(KeyError::UnknownField(field.clone())),
    }
}
