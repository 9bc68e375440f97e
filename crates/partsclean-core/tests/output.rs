use partsclean_core::output::{derive_output_key, encode_json};
use partsclean_core::record::{FieldValue, NormalizedRecord};
use serde_json::Value;

#[test]
fn output_key_replaces_csv_extension() {
    assert_eq!(derive_output_key("incoming/parts.csv"), "incoming/parts.json");
    assert_eq!(derive_output_key("incoming/PARTS.CSV"), "incoming/PARTS.json");
    assert_eq!(derive_output_key("incoming/parts.txt"), "incoming/parts.txt.json");
    assert_eq!(derive_output_key("parts"), "parts.json");
}

#[test]
fn json_keeps_field_order_numbers_and_unicode() {
    let record = NormalizedRecord {
        line: 2,
        fields: vec![
            ("codigo".to_string(), FieldValue::from("COD-ÑANDÚ1")),
            ("stock".to_string(), FieldValue::Integer(50)),
            ("precio".to_string(), FieldValue::Decimal(99.9)),
            ("descripcion".to_string(), FieldValue::from("bujía de encendido")),
        ],
        dropped: vec!["notas".to_string()],
        overflow: Vec::new(),
    };

    let bytes = encode_json(&[record]).unwrap();
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.contains("bujía de encendido"));
    assert!(!text.contains("\\u"));
    assert!(!text.contains("notas"));

    let codigo_at = text.find("codigo").unwrap();
    let stock_at = text.find("stock").unwrap();
    let precio_at = text.find("precio").unwrap();
    assert!(codigo_at < stock_at && stock_at < precio_at);

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed[0]["stock"], Value::from(50));
    assert_eq!(parsed[0]["precio"], Value::from(99.9));
}

#[test]
fn empty_result_is_an_empty_array() {
    let bytes = encode_json(&[]).unwrap();
    let parsed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed, Value::Array(Vec::new()));
}
