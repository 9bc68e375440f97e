//! Two-stage duplicate removal. Both stages keep the first occurrence.

use std::collections::HashSet;

use crate::record::{FieldValue, NormalizedRecord};

type Content = (Vec<(String, FieldValue)>, Vec<String>);

/// Tracks full normalized contents already seen in this run.
///
/// The seen-set stores the field/value pairs and overflow cells themselves,
/// so a hash collision is always settled by structural equality.
#[derive(Debug, Default)]
pub struct ExactDeduplicator {
    seen: HashSet<Content>,
}

impl ExactDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time a given content is observed.
    pub fn observe(&mut self, record: &NormalizedRecord) -> bool {
        let (fields, overflow) = record.content();
        self.seen.insert((fields.to_vec(), overflow.to_vec()))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Values of the business-key fields for one record. Text components are
/// lower-cased so that `cod-abc123` and `COD-ABC123` name the same part;
/// absent fields are part of the key as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusinessKey(Vec<Option<FieldValue>>);

impl BusinessKey {
    pub fn of(record: &NormalizedRecord, fields: &[String]) -> Self {
        Self(
            fields
                .iter()
                .map(|field| record.get(field).map(canonical_component))
                .collect(),
        )
    }

    pub fn components(&self) -> &[Option<FieldValue>] {
        &self.0
    }
}

fn canonical_component(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(text) => FieldValue::Text(text.to_lowercase()),
        other => other.clone(),
    }
}

/// Business keys of rows that were accepted. Rows that fail validation never
/// enter this set.
#[derive(Debug, Default)]
pub struct KeyDeduplicator {
    seen: HashSet<BusinessKey>,
}

impl KeyDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seen(&self, key: &BusinessKey) -> bool {
        self.seen.contains(key)
    }

    /// Returns `true` when the key was novel and is now registered.
    pub fn register(&mut self, key: BusinessKey) -> bool {
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
