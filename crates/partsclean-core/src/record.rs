use std::fmt;
use std::hash::{Hash, Hasher};

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// A cleaned cell value. Numeric columns declared by the rule profile are
/// coerced to `Integer`/`Decimal`; everything else stays trimmed text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Decimal(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }
}

// Decimals compare by bit pattern so equality and hashing agree.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => a.to_bits() == b.to_bits(),
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Integer(value) => value.hash(state),
            FieldValue::Decimal(value) => value.to_bits().hash(state),
            FieldValue::Text(value) => value.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Decimal(value) => write!(f, "{value}"),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

/// A record after normalization: lower-cased column names mapped to cleaned
/// values, in header order. Blank and placeholder cells are not present in
/// `fields`; their column names are kept in `dropped` for the row-wide checks.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub line: usize,
    pub fields: Vec<(String, FieldValue)>,
    pub dropped: Vec<String>,
    pub overflow: Vec<String>,
}

impl NormalizedRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn was_dropped(&self, field: &str) -> bool {
        self.dropped.iter().any(|name| name == field)
    }

    /// Number of cells the source line actually carried, including overflow.
    pub fn width(&self) -> usize {
        self.fields.len() + self.dropped.len() + self.overflow.len()
    }

    /// Field/value pairs in order plus any overflow cells; the identity used
    /// for exact-duplicate checks.
    pub fn content(&self) -> (&[(String, FieldValue)], &[String]) {
        (&self.fields, &self.overflow)
    }
}

impl Serialize for NormalizedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
