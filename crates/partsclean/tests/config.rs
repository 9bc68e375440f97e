use std::collections::HashMap;

use partsclean_core::config::{parse_delimiter, AppConfig, ConfigError, DEFAULT_PROFILE};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_apply_when_nothing_is_set() {
    let config = AppConfig::from_lookup(lookup(&[])).unwrap();

    assert_eq!(config.profile, DEFAULT_PROFILE);
    assert_eq!(config.output_bucket, None);
    assert_eq!(config.csv_options.delimiter, b',');
    assert_eq!(config.database_url, None);
    assert_eq!(config.target_table.table(), "inventory_parts");
    assert_eq!(config.bind.port(), 3000);
}

#[test]
fn reads_all_settings() {
    let config = AppConfig::from_lookup(lookup(&[
        ("PARTSCLEAN_PROFILE", "wholesale"),
        ("OUTPUT_BUCKET", "inventory-results"),
        ("CSV_DELIMITER", ";"),
        ("DATABASE_URL", "postgres://localhost/parts"),
        ("PARTSCLEAN_TARGET_TABLE", "stock_levels:codigo,stock"),
        ("S3_ENDPOINT_URL", "http://localhost:9000"),
        ("S3_FORCE_PATH_STYLE", "true"),
        ("PARTSCLEAN_BIND", "127.0.0.1:8088"),
    ]))
    .unwrap();

    assert_eq!(config.profile, "wholesale");
    assert_eq!(config.output_bucket.as_deref(), Some("inventory-results"));
    assert_eq!(config.csv_options.delimiter, b';');
    assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/parts"));
    assert_eq!(config.target_table.columns().len(), 2);
    assert!(config.s3.force_path_style);
    assert_eq!(config.bind.to_string(), "127.0.0.1:8088");
}

#[test]
fn rejects_bad_values() {
    assert!(matches!(
        AppConfig::from_lookup(lookup(&[("CSV_DELIMITER", ";;")])),
        Err(ConfigError::InvalidDelimiter(_))
    ));
    assert!(matches!(
        AppConfig::from_lookup(lookup(&[("PARTSCLEAN_BIND", "everywhere")])),
        Err(ConfigError::InvalidBind { .. })
    ));
    assert!(matches!(
        AppConfig::from_lookup(lookup(&[("PARTSCLEAN_TARGET_TABLE", "parts-2024")])),
        Err(ConfigError::TargetTable(_))
    ));
    assert!(matches!(
        AppConfig::from_lookup(lookup(&[("S3_FORCE_PATH_STYLE", "maybe")])),
        Err(ConfigError::Bucket(_))
    ));
}

#[test]
fn delimiter_accepts_tab_spellings() {
    assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
    assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
    assert_eq!(parse_delimiter("|").unwrap(), b'|');
    assert!(parse_delimiter("\"").is_err());
    assert!(parse_delimiter("ñ").is_err());
}
