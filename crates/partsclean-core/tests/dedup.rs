use partsclean_core::dedup::{BusinessKey, ExactDeduplicator, KeyDeduplicator};
use partsclean_core::record::{FieldValue, NormalizedRecord};

fn record(line: usize, fields: &[(&str, FieldValue)]) -> NormalizedRecord {
    NormalizedRecord {
        line,
        fields: fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
        dropped: Vec::new(),
        overflow: Vec::new(),
    }
}

#[test]
fn exact_stage_compares_whole_content_in_order() {
    let a = record(
        2,
        &[("codigo", "COD-ABC123".into()), ("stock", FieldValue::Integer(5))],
    );
    let same_content_other_line = record(
        3,
        &[("codigo", "COD-ABC123".into()), ("stock", FieldValue::Integer(5))],
    );
    let reordered = record(
        4,
        &[("stock", FieldValue::Integer(5)), ("codigo", "COD-ABC123".into())],
    );
    let other_value = record(
        5,
        &[("codigo", "COD-ABC123".into()), ("stock", FieldValue::Integer(6))],
    );

    let mut dedup = ExactDeduplicator::new();
    assert!(dedup.observe(&a));
    assert!(!dedup.observe(&same_content_other_line));
    assert!(dedup.observe(&reordered));
    assert!(dedup.observe(&other_value));
    assert_eq!(dedup.len(), 3);
}

#[test]
fn overflow_cells_are_part_of_the_identity() {
    let ragged = NormalizedRecord {
        overflow: vec!["junk".to_string()],
        ..record(2, &[("codigo", "COD-ABC123".into())])
    };
    let clean = record(3, &[("codigo", "COD-ABC123".into())]);

    let mut dedup = ExactDeduplicator::new();
    assert!(dedup.observe(&ragged));
    assert!(dedup.observe(&clean));
    assert!(!dedup.observe(&record(4, &[("codigo", "COD-ABC123".into())])));
}

#[test]
fn integer_and_text_values_are_distinct() {
    let numeric = record(2, &[("stock", FieldValue::Integer(5))]);
    let textual = record(3, &[("stock", FieldValue::from("5"))]);

    let mut dedup = ExactDeduplicator::new();
    assert!(dedup.observe(&numeric));
    assert!(dedup.observe(&textual));
}

#[test]
fn business_key_tracks_missing_fields_and_case() {
    let fields = vec!["codigo".to_string(), "motor".to_string()];
    let upper = record(2, &[("codigo", "COD-ABC123".into())]);
    let lower = record(3, &[("codigo", "cod-abc123".into())]);
    let with_engine = record(4, &[("codigo", "COD-ABC123".into()), ("motor", "1.6".into())]);

    let key_upper = BusinessKey::of(&upper, &fields);
    assert_eq!(key_upper.components()[1], None);
    assert_eq!(key_upper, BusinessKey::of(&lower, &fields));
    assert_ne!(key_upper, BusinessKey::of(&with_engine, &fields));

    let mut keys = KeyDeduplicator::new();
    assert!(!keys.is_seen(&key_upper));
    assert!(keys.register(key_upper.clone()));
    assert!(keys.is_seen(&BusinessKey::of(&lower, &fields)));
    assert!(!keys.register(key_upper));
    assert_eq!(keys.len(), 1);
}
