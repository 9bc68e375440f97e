// crates/partsclean-core/src/error.rs

use thiserror::Error;

/// Structural failures. Bad data never produces one of these; it becomes a
/// rejected row instead.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("header has no columns")]
    EmptyHeader,

    #[error("header columns '{first}' and '{second}' both normalize to '{column}'")]
    DuplicateColumn {
        column: String,
        first: String,
        second: String,
    },

    #[error("record on line {line} has column '{column}' that is not in the header")]
    HeaderMismatch { line: usize, column: String },

    #[error("unknown rule profile '{0}'")]
    UnknownProfile(String),

    #[error("invalid rule profile '{profile}': {reason}")]
    InvalidProfile { profile: String, reason: String },

    #[error("failed to read rule profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule profile TOML error: {0}")]
    ProfileToml(#[from] toml::de::Error),

    #[error("CSV input error: {0}")]
    Parser(#[from] partsclean_parser::ParserError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
