//! Runtime settings, read from the environment (and `.env` when present).

use std::env;
use std::net::{AddrParseError, SocketAddr};

use partsclean_bucket::{BucketError, S3Config};
use partsclean_parser::CsvOptions;
use thiserror::Error;

use crate::sink::{SinkError, TargetTable};

pub const DEFAULT_PROFILE: &str = "standard";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CSV_DELIMITER must be a single ASCII character, got `{0}`")]
    InvalidDelimiter(String),

    #[error("PARTSCLEAN_BIND is not a socket address: `{value}`")]
    InvalidBind {
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("PARTSCLEAN_TARGET_TABLE: {0}")]
    TargetTable(#[from] SinkError),

    #[error(transparent)]
    Bucket(#[from] BucketError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Built-in profile name or path to a TOML profile.
    pub profile: String,
    /// Destination bucket for results; the source bucket when unset.
    pub output_bucket: Option<String>,
    pub csv_options: CsvOptions,
    /// Enables the relational sink when set.
    pub database_url: Option<String>,
    pub target_table: TargetTable,
    pub s3: S3Config,
    pub bind: SocketAddr,
}

impl AppConfig {
    /// Loads `.env` if one exists, then reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let csv_options = match lookup("CSV_DELIMITER") {
            Some(raw) if !raw.is_empty() => CsvOptions {
                delimiter: parse_delimiter(&raw)?,
            },
            _ => CsvOptions::default(),
        };

        let target_table = match var("PARTSCLEAN_TARGET_TABLE") {
            Some(raw) => TargetTable::parse(&raw)?,
            None => TargetTable::default(),
        };

        let bind_raw = var("PARTSCLEAN_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .map_err(|source| ConfigError::InvalidBind {
                value: bind_raw.clone(),
                source,
            })?;

        Ok(Self {
            profile: var("PARTSCLEAN_PROFILE").unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
            output_bucket: var("OUTPUT_BUCKET"),
            csv_options,
            database_url: var("DATABASE_URL"),
            target_table,
            s3: S3Config::from_lookup(&lookup)?,
            bind,
        })
    }
}

/// Accepts one ASCII character, or `\t` / `tab` for tab-separated files.
pub fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    match raw {
        "\\t" | "tab" | "\t" => return Ok(b'\t'),
        _ => {}
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(c as u8),
        _ => Err(ConfigError::InvalidDelimiter(raw.to_string())),
    }
}
