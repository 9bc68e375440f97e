//! Single-value predicates. Every function here is total: malformed input
//! yields `false`, never an error or a panic.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::FieldValue;

static MILLIMETRES_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{2,3})\s*mm$").unwrap());

static TRIPLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*\*\s*(\d+(?:\.\d+)?)\s*\*\s*(\d+(?:\.\d+)?)$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionShape {
    /// Two or three digits followed by `mm`, e.g. `65mm`.
    Millimetres,
    /// Three numbers joined by `*`, e.g. `195.5*65*15`.
    Triple,
}

/// A configured check over one field value.
#[derive(Debug, Clone)]
pub enum FieldValidator {
    CodeFormat {
        prefix: String,
        min_len: usize,
        max_len: usize,
    },
    Category {
        allowed: HashSet<String>,
    },
    BoundedInteger {
        min: i64,
        max: i64,
    },
    BoundedDecimal {
        min_exclusive: f64,
        max_inclusive: f64,
    },
    Dimension {
        shape: DimensionShape,
        min: f64,
        max: f64,
    },
    Year {
        min: i64,
        max: i64,
    },
    DescriptiveText {
        min_chars: usize,
        min_tokens: usize,
        forbidden_prefixes: Vec<String>,
    },
    NotDigitsOnly,
}

impl FieldValidator {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValidator::CodeFormat { .. } => "code_format",
            FieldValidator::Category { .. } => "category",
            FieldValidator::BoundedInteger { .. } => "bounded_integer",
            FieldValidator::BoundedDecimal { .. } => "bounded_decimal",
            FieldValidator::Dimension { .. } => "dimension",
            FieldValidator::Year { .. } => "year",
            FieldValidator::DescriptiveText { .. } => "descriptive_text",
            FieldValidator::NotDigitsOnly => "not_digits_only",
        }
    }

    pub fn check(&self, value: &FieldValue) -> bool {
        match self {
            FieldValidator::CodeFormat {
                prefix,
                min_len,
                max_len,
            } => value
                .as_text()
                .is_some_and(|text| code_format(text, prefix, *min_len, *max_len)),
            FieldValidator::Category { allowed } => value
                .as_text()
                .is_some_and(|text| category_member(text, allowed)),
            FieldValidator::BoundedInteger { min, max } => bounded_integer(value, *min, *max),
            FieldValidator::BoundedDecimal {
                min_exclusive,
                max_inclusive,
            } => bounded_decimal(value, *min_exclusive, *max_inclusive),
            FieldValidator::Dimension { shape, min, max } => {
                dimension(&value.to_string(), *shape, *min, *max)
            }
            FieldValidator::Year { min, max } => bounded_integer(value, *min, *max),
            FieldValidator::DescriptiveText {
                min_chars,
                min_tokens,
                forbidden_prefixes,
            } => value.as_text().is_some_and(|text| {
                descriptive_text(text, *min_chars, *min_tokens, forbidden_prefixes)
            }),
            FieldValidator::NotDigitsOnly => match value {
                FieldValue::Text(text) => !digits_only(text),
                FieldValue::Integer(_) | FieldValue::Decimal(_) => false,
            },
        }
    }

    /// Human-readable explanation used when the check fails.
    pub fn describe(&self) -> String {
        match self {
            FieldValidator::CodeFormat {
                prefix,
                min_len,
                max_len,
            } => format!("expected {prefix} followed by {min_len}-{max_len} alphanumeric characters"),
            FieldValidator::Category { allowed } => {
                let mut names: Vec<&str> = allowed.iter().map(String::as_str).collect();
                names.sort_unstable();
                format!("expected one of: {}", names.join(", "))
            }
            FieldValidator::BoundedInteger { min, max } => {
                format!("expected an integer between {min} and {max}")
            }
            FieldValidator::BoundedDecimal {
                min_exclusive,
                max_inclusive,
            } => format!("expected a number greater than {min_exclusive} and at most {max_inclusive}"),
            FieldValidator::Dimension { shape, min, max } => match shape {
                DimensionShape::Millimetres => {
                    format!("expected NNmm or NNNmm with a value between {min} and {max}")
                }
                DimensionShape::Triple => {
                    format!("expected A*B*C with every component between {min} and {max}")
                }
            },
            FieldValidator::Year { min, max } => format!("expected a year between {min} and {max}"),
            FieldValidator::DescriptiveText {
                min_chars,
                min_tokens,
                ..
            } => format!(
                "expected at least {min_chars} characters and {min_tokens} words without boilerplate prefix"
            ),
            FieldValidator::NotDigitsOnly => "value must not consist only of digits".to_string(),
        }
    }
}

/// `prefix` (any case) followed by `min_len..=max_len` ASCII alphanumerics.
pub fn code_format(value: &str, prefix: &str, min_len: usize, max_len: usize) -> bool {
    let value = value.trim();
    let Some(head) = value.get(..prefix.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(prefix) {
        return false;
    }
    let rest = &value[prefix.len()..];
    let len = rest.chars().count();
    len >= min_len && len <= max_len && rest.chars().all(|ch| ch.is_ascii_alphanumeric())
}

/// Case-sensitive membership of the trimmed value.
pub fn category_member(value: &str, allowed: &HashSet<String>) -> bool {
    allowed.contains(value.trim())
}

/// Inclusive integer range. Decimals never qualify, even whole ones.
pub fn bounded_integer(value: &FieldValue, min: i64, max: i64) -> bool {
    let parsed = match value {
        FieldValue::Integer(number) => Some(*number),
        FieldValue::Text(text) => text.trim().parse::<i64>().ok(),
        FieldValue::Decimal(_) => None,
    };
    parsed.is_some_and(|number| number >= min && number <= max)
}

/// Exclusive lower bound, inclusive upper bound.
pub fn bounded_decimal(value: &FieldValue, min_exclusive: f64, max_inclusive: f64) -> bool {
    let parsed = match value {
        FieldValue::Text(text) => text.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    };
    parsed.is_some_and(|number| number.is_finite() && number > min_exclusive && number <= max_inclusive)
}

pub fn dimension(value: &str, shape: DimensionShape, min: f64, max: f64) -> bool {
    let pattern = match shape {
        DimensionShape::Millimetres => &*MILLIMETRES_PATTERN,
        DimensionShape::Triple => &*TRIPLE_PATTERN,
    };
    let Some(captures) = pattern.captures(value.trim()) else {
        return false;
    };
    captures.iter().skip(1).all(|component| {
        component
            .and_then(|matched| matched.as_str().parse::<f64>().ok())
            .is_some_and(|number| number >= min && number <= max)
    })
}

pub fn descriptive_text(
    value: &str,
    min_chars: usize,
    min_tokens: usize,
    forbidden_prefixes: &[String],
) -> bool {
    let text = value.trim();
    text.chars().count() >= min_chars
        && text.split_whitespace().count() >= min_tokens
        && !forbidden_prefixes
            .iter()
            .any(|prefix| text.starts_with(prefix.as_str()))
}

/// True when the value has at least one digit and nothing but digits and spaces.
pub fn digits_only(value: &str) -> bool {
    let mut saw_digit = false;
    for ch in value.chars() {
        if ch.is_ascii_digit() {
            saw_digit = true;
        } else if !ch.is_whitespace() {
            return false;
        }
    }
    saw_digit
}

pub fn contains_forbidden(value: &str, forbidden: &[char]) -> bool {
    value.chars().any(|ch| forbidden.contains(&ch))
}

/// `placeholders` must already be lower-cased.
pub fn is_placeholder(value: &str, placeholders: &HashSet<String>) -> bool {
    placeholders.contains(&value.trim().to_lowercase())
}

/// Fully lower-case, fully upper-case, or an upper-case letter followed by a
/// lower-case one.
pub fn capitalization_consistent(value: &str) -> bool {
    let all_lower = !value.chars().any(char::is_uppercase);
    let all_upper = !value.chars().any(char::is_lowercase);
    if all_lower || all_upper {
        return true;
    }
    let mut chars = value.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(first), Some(second)) if first.is_uppercase() && second.is_lowercase()
    )
}
