use partsclean_core::event::{decode_key, ObjectRef, S3Event};

#[test]
fn parses_notification_and_decodes_first_key() {
    let payload = r#"{
        "Records": [
            {
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "bucket": { "name": "inventory-uploads", "arn": "arn:aws:s3:::inventory-uploads" },
                    "object": { "key": "proveedores/lista+de+precios%C3%B1.csv", "size": 2048, "eTag": "abc" }
                }
            },
            {
                "s3": {
                    "bucket": { "name": "other" },
                    "object": { "key": "ignored.csv" }
                }
            }
        ]
    }"#;

    let event: S3Event = serde_json::from_str(payload).unwrap();

    assert_eq!(event.records.len(), 2);
    assert_eq!(event.records[0].s3.object.size, Some(2048));
    assert_eq!(
        event.first_object(),
        Some(ObjectRef {
            bucket: "inventory-uploads".to_string(),
            key: "proveedores/lista de preciosñ.csv".to_string(),
        })
    );
}

#[test]
fn empty_event_has_no_object() {
    let event: S3Event = serde_json::from_str("{}").unwrap();
    assert!(event.first_object().is_none());
}

#[test]
fn decode_key_handles_plain_and_escaped_keys() {
    assert_eq!(decode_key("incoming/parts.csv"), "incoming/parts.csv");
    assert_eq!(decode_key("a%2Bb+c.csv"), "a+b c.csv");
    assert_eq!(decode_key("x%3Dy%26z.csv"), "x=y&z.csv");
    assert_eq!(decode_key("lote=&marca=bosch.csv"), "lote=&marca=bosch.csv");
}
