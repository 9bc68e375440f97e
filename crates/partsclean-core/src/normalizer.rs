use partsclean_parser::RawRecord;

use crate::profile::{NumericKind, RuleSet};
use crate::record::{FieldValue, NormalizedRecord};
use crate::validators::is_placeholder;

/// Lower-cases and trims a header column name.
pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Coerces a trimmed value to the declared numeric kind, falling back to text
/// so the validators can reject it with a proper reason.
pub fn coerce(value: &str, kind: NumericKind) -> FieldValue {
    match kind {
        NumericKind::Integer => value
            .parse::<i64>()
            .map(FieldValue::Integer)
            .unwrap_or_else(|_| FieldValue::Text(value.to_string())),
        NumericKind::Decimal => match value.parse::<f64>() {
            Ok(number) if number.is_finite() => FieldValue::Decimal(number),
            _ => FieldValue::Text(value.to_string()),
        },
    }
}

/// Turns a raw CSV record into its normalized form. Never fails.
pub fn normalize(raw: &RawRecord, rules: &RuleSet) -> NormalizedRecord {
    let mut fields: Vec<(String, FieldValue)> = Vec::with_capacity(raw.fields().len());
    let mut dropped = Vec::new();

    for (column, value) in raw.fields() {
        let name = normalize_column(column);
        let trimmed = value.trim();

        if trimmed.is_empty() || is_placeholder(trimmed, rules.placeholders()) {
            dropped.push(name);
            continue;
        }

        let value = match rules.numeric_kind(&name) {
            Some(kind) => coerce(trimmed, kind),
            None => FieldValue::Text(trimmed.to_string()),
        };

        // Columns that collapse to the same name keep the first position and the last value.
        match fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => fields.push((name, value)),
        }
    }

    NormalizedRecord {
        line: raw.line(),
        fields,
        dropped,
        overflow: raw
            .overflow()
            .iter()
            .map(|value| value.trim().to_string())
            .collect(),
    }
}
