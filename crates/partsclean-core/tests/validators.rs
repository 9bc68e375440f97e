use std::collections::HashSet;

use partsclean_core::record::FieldValue;
use partsclean_core::validators::{
    bounded_decimal, bounded_integer, capitalization_consistent, category_member, code_format,
    contains_forbidden, descriptive_text, digits_only, dimension, is_placeholder, DimensionShape,
    FieldValidator,
};

fn set(values: &[&str]) -> HashSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn code_format_accepts_six_to_eight_alphanumerics_in_any_case() {
    assert!(code_format("COD-ABC123", "COD-", 6, 8));
    assert!(code_format("cod-abc123", "COD-", 6, 8));
    assert!(code_format("  COD-12345678 ", "COD-", 6, 8));

    assert!(!code_format("COD-ABC12", "COD-", 6, 8));
    assert!(!code_format("COD-ABCDEFGHI", "COD-", 6, 8));
    assert!(!code_format("COD-ABC_12", "COD-", 6, 8));
    assert!(!code_format("XCOD-ABC123", "COD-", 6, 8));
    assert!(!code_format("", "COD-", 6, 8));
    assert!(!code_format("ÇOD-ABC123", "COD-", 6, 8));
}

#[test]
fn category_is_case_sensitive_on_trimmed_value() {
    let brands = set(&["Bosch", "Magneti Marelli"]);

    assert!(category_member("Bosch", &brands));
    assert!(category_member("  Magneti Marelli ", &brands));
    assert!(!category_member("bosch", &brands));
    assert!(!category_member("123", &brands));

    let validator = FieldValidator::Category { allowed: brands };
    assert!(!validator.check(&FieldValue::Integer(123)));
}

#[test]
fn bounded_integer_is_inclusive_and_never_panics() {
    assert!(bounded_integer(&FieldValue::Integer(0), 0, 1000));
    assert!(bounded_integer(&FieldValue::Integer(1000), 0, 1000));
    assert!(!bounded_integer(&FieldValue::Integer(1001), 0, 1000));
    assert!(bounded_integer(&FieldValue::from("12"), 0, 1000));
    assert!(!bounded_integer(&FieldValue::from("-1"), 0, 1000));
    assert!(!bounded_integer(&FieldValue::from("abc"), 0, 1000));
    assert!(!bounded_integer(&FieldValue::from("99999999999999999999999"), 0, 1000));
    assert!(!bounded_integer(&FieldValue::Decimal(5.0), 0, 1000));
}

#[test]
fn bounded_decimal_excludes_lower_bound() {
    assert!(!bounded_decimal(&FieldValue::Decimal(0.0), 0.0, 10000.0));
    assert!(bounded_decimal(&FieldValue::Decimal(0.01), 0.0, 10000.0));
    assert!(bounded_decimal(&FieldValue::Decimal(10000.0), 0.0, 10000.0));
    assert!(!bounded_decimal(&FieldValue::Decimal(10000.01), 0.0, 10000.0));
    assert!(bounded_decimal(&FieldValue::Integer(5), 0.0, 10000.0));
    assert!(bounded_decimal(&FieldValue::from("99.90"), 0.0, 10000.0));
    assert!(!bounded_decimal(&FieldValue::from("NaN"), 0.0, 10000.0));
    assert!(!bounded_decimal(&FieldValue::from("inf"), 0.0, 10000.0));
    assert!(!bounded_decimal(&FieldValue::from("x"), 0.0, 10000.0));
}

#[test]
fn millimetre_dimension_checks_pattern_then_range() {
    let shape = DimensionShape::Millimetres;

    assert!(!dimension("25mm", shape, 30.0, 250.0));
    assert!(dimension("30mm", shape, 30.0, 250.0));
    assert!(dimension("65 MM", shape, 30.0, 250.0));
    assert!(dimension("250mm", shape, 30.0, 250.0));
    assert!(!dimension("251mm", shape, 30.0, 250.0));
    assert!(!dimension("1000mm", shape, 30.0, 2000.0));
    assert!(!dimension("65", shape, 30.0, 250.0));
    assert!(!dimension("6.5mm", shape, 1.0, 250.0));
}

#[test]
fn triple_dimension_checks_every_component() {
    let shape = DimensionShape::Triple;

    assert!(dimension("195.5*65*15", shape, 1.0, 400.0));
    assert!(dimension("195.5 * 65.0 * 15.0", shape, 1.0, 400.0));
    assert!(!dimension("195.5*65", shape, 1.0, 400.0));
    assert!(!dimension("0.5*65*15", shape, 1.0, 400.0));
    assert!(!dimension("195*65*401", shape, 1.0, 400.0));
    assert!(!dimension("a*b*c", shape, 1.0, 400.0));
}

#[test]
fn year_validator_uses_configured_window() {
    let validator = FieldValidator::Year {
        min: 1950,
        max: 2026,
    };

    assert!(validator.check(&FieldValue::Integer(1950)));
    assert!(validator.check(&FieldValue::Integer(2026)));
    assert!(!validator.check(&FieldValue::Integer(2027)));
    assert!(!validator.check(&FieldValue::Integer(1949)));
    assert!(validator.check(&FieldValue::from("1999")));
    assert!(!validator.check(&FieldValue::from("19x")));
}

#[test]
fn descriptive_text_needs_length_tokens_and_clean_prefix() {
    let prefixes = vec!["House".to_string(), "Participant".to_string()];

    assert!(descriptive_text("filtro de aceite", 5, 2, &prefixes));
    assert!(!descriptive_text("filtro", 5, 2, &prefixes));
    assert!(!descriptive_text("a b", 5, 2, &prefixes));
    assert!(!descriptive_text("House of parts", 5, 2, &prefixes));
    assert!(descriptive_text("house of parts", 5, 2, &prefixes));
}

#[test]
fn digits_only_and_not_digits_only_rule() {
    assert!(digits_only("123"));
    assert!(digits_only(" 12 3 "));
    assert!(!digits_only("12a"));
    assert!(!digits_only(""));
    assert!(!digits_only("   "));

    let validator = FieldValidator::NotDigitsOnly;
    assert!(validator.check(&FieldValue::from("Bosch")));
    assert!(!validator.check(&FieldValue::from("123")));
    assert!(!validator.check(&FieldValue::Integer(123)));
}

#[test]
fn forbidden_characters_and_placeholders() {
    let forbidden = ['@', '#', '?', '%', '&'];
    assert!(contains_forbidden("a@b", &forbidden));
    assert!(contains_forbidden("50%", &forbidden));
    assert!(!contains_forbidden("plain text", &forbidden));

    let placeholders = set(&["n/a", "-", "null", "sin dato", "none", "", "na"]);
    assert!(is_placeholder("N/A ", &placeholders));
    assert!(is_placeholder("Sin Dato", &placeholders));
    assert!(is_placeholder("   ", &placeholders));
    assert!(!is_placeholder("nada", &placeholders));
}

#[test]
fn capitalization_accepts_three_forms_only() {
    assert!(capitalization_consistent("bosch"));
    assert!(capitalization_consistent("BOSCH"));
    assert!(capitalization_consistent("Bosch"));
    assert!(capitalization_consistent("Magneti Marelli"));
    assert!(capitalization_consistent("COD-123"));
    assert!(!capitalization_consistent("ACDelco"));
    assert!(!capitalization_consistent("bOSCH"));
}

#[test]
fn describe_mentions_parameters() {
    let validator = FieldValidator::BoundedInteger { min: 0, max: 1000 };
    assert_eq!(validator.kind(), "bounded_integer");
    assert!(validator.describe().contains("1000"));
}
