use bytes::Bytes;
use partsclean_bucket::{BucketError, BucketStore, InMemoryBucketStore, S3Config};

#[tokio::test]
async fn put_then_get_returns_same_bytes() {
    let store = InMemoryBucketStore::new();
    store
        .put_object("results", "incoming/parts.json", Bytes::from_static(b"[]\n"), "application/json")
        .await
        .unwrap();

    let bytes = store.get_object("results", "incoming/parts.json").await.unwrap();
    assert_eq!(bytes.as_ref(), b"[]\n");

    let stored = store.object("results", "incoming/parts.json").await.unwrap();
    assert_eq!(stored.content_type, "application/json");
}

#[tokio::test]
async fn objects_are_scoped_by_bucket() {
    let store = InMemoryBucketStore::new();
    store.insert("uploads", "parts.csv", "codigo\n").await;

    let err = store.get_object("results", "parts.csv").await.unwrap_err();
    match err {
        BucketError::NotFound { bucket, key } => {
            assert_eq!(bucket, "results");
            assert_eq!(key, "parts.csv");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn put_overwrites_existing_object() {
    let store = InMemoryBucketStore::new();
    store.insert("results", "parts.json", "old").await;
    store
        .put_object("results", "parts.json", Bytes::from_static(b"new"), "application/json")
        .await
        .unwrap();

    let bytes = store.get_object("results", "parts.json").await.unwrap();
    assert_eq!(bytes.as_ref(), b"new");
    assert_eq!(store.len().await, 1);
}

#[test]
fn default_config_targets_us_east_1() {
    let config = S3Config::default();
    assert_eq!(config.region, "us-east-1");
    assert!(config.endpoint.is_none());
    assert!(!config.force_path_style);
}

#[test]
fn config_lookup_reads_endpoint_and_path_style() {
    let config = S3Config::from_lookup(|name| match name {
        "S3_ENDPOINT_URL" => Some("http://localhost:9000".to_string()),
        "S3_FORCE_PATH_STYLE" => Some("true".to_string()),
        "S3_REGION" => Some("  ".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
    assert!(config.force_path_style);
    assert_eq!(config.region, "us-east-1");
}

#[test]
fn config_lookup_rejects_bad_flag() {
    let err = S3Config::from_lookup(|name| {
        (name == "S3_FORCE_PATH_STYLE").then(|| "sometimes".to_string())
    })
    .unwrap_err();
    assert!(matches!(err, BucketError::Configuration(_)));
}
