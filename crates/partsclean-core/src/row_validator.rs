use partsclean_parser::Header;
use serde::{Deserialize, Serialize};

use crate::profile::RuleSet;
use crate::record::{FieldValue, NormalizedRecord};
use crate::validators::{capitalization_consistent, contains_forbidden};

pub const RULE_REQUIRED_FIELD: &str = "required_field";
pub const RULE_ROW_SHAPE: &str = "row_shape";
pub const RULE_FORBIDDEN_CHARACTER: &str = "forbidden_character";
pub const RULE_PLACEHOLDER_FRACTION: &str = "placeholder_fraction";
pub const RULE_CAPITALIZATION: &str = "capitalization";

/// One failed rule for a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl Rejection {
    fn new(rule: &str, field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            field: field.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Runs every configured rule against `record` and returns all failures in a
/// fixed order: required fields, row shape, field rules (profile order),
/// forbidden characters, placeholder fraction, capitalization. An empty result
/// means the row is valid.
pub fn validate_row(record: &NormalizedRecord, header: &Header, rules: &RuleSet) -> Vec<Rejection> {
    let mut rejections = Vec::new();

    for field in rules.required_fields() {
        if record.contains(field) {
            continue;
        }
        let message = if record.was_dropped(field) {
            "required field is blank or a placeholder"
        } else {
            "required field is missing"
        };
        rejections.push(Rejection::new(RULE_REQUIRED_FIELD, Some(field), message));
    }

    if rules.check_row_shape() && record.width() != header.len() {
        rejections.push(Rejection::new(
            RULE_ROW_SHAPE,
            None,
            format!(
                "row has {} fields but the header has {}",
                record.width(),
                header.len()
            ),
        ));
    }

    // Absent fields are skipped here; the required-field check above owns them.
    for rule in rules.field_rules() {
        let Some(value) = record.get(&rule.field) else {
            continue;
        };
        if !rule.validator.check(value) {
            rejections.push(Rejection::new(
                rule.validator.kind(),
                Some(&rule.field),
                format!("'{value}': {}", rule.validator.describe()),
            ));
        }
    }

    let forbidden = rules.forbidden_chars();
    if !forbidden.is_empty() {
        for (name, value) in &record.fields {
            if let FieldValue::Text(text) = value {
                if contains_forbidden(text, forbidden) {
                    rejections.push(Rejection::new(
                        RULE_FORBIDDEN_CHARACTER,
                        Some(name),
                        format!("'{text}' contains a forbidden character"),
                    ));
                }
            }
        }
        if record
            .overflow
            .iter()
            .any(|value| contains_forbidden(value, forbidden))
        {
            rejections.push(Rejection::new(
                RULE_FORBIDDEN_CHARACTER,
                None,
                "a value beyond the header width contains a forbidden character",
            ));
        }
    }

    if !header.is_empty() {
        let fraction = record.dropped.len() as f64 / header.len() as f64;
        if fraction > rules.max_placeholder_fraction() {
            rejections.push(Rejection::new(
                RULE_PLACEHOLDER_FRACTION,
                None,
                format!(
                    "{} of {} fields are blank or placeholders",
                    record.dropped.len(),
                    header.len()
                ),
            ));
        }
    }

    if rules.check_capitalization() {
        for (name, value) in &record.fields {
            if let FieldValue::Text(text) = value {
                if !capitalization_consistent(text) {
                    rejections.push(Rejection::new(
                        RULE_CAPITALIZATION,
                        Some(name),
                        format!("'{text}' mixes letter case inconsistently"),
                    ));
                }
            }
        }
    }

    rejections
}
