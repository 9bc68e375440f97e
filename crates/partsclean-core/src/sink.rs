//! Optional relational destination for accepted records.
//!
//! The target table must already exist. Each accepted record becomes one
//! `INSERT`; a failed row is logged and skipped so that one bad row cannot
//! block the rest of the file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};

use crate::record::{FieldValue, NormalizedRecord};

pub const DEFAULT_TARGET_TABLE: &str = "inventory_parts";
pub const DEFAULT_TARGET_COLUMNS: [&str; 6] =
    ["codigo", "nombre", "descripcion", "marca", "stock", "precio"];

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid SQL identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("target table '{0}' has no columns")]
    NoColumns(String),
}

/// Table name plus the record fields written to it, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTable {
    table: String,
    columns: Vec<String>,
}

impl TargetTable {
    pub fn new<I, S>(table: impl Into<String>, columns: I) -> Result<Self, SinkError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = table.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        validate_identifier(&table)?;
        if columns.is_empty() {
            return Err(SinkError::NoColumns(table));
        }
        for column in &columns {
            validate_identifier(column)?;
        }
        Ok(Self { table, columns })
    }

    /// Parses `table` or `table:col_a,col_b`. A bare table name uses the
    /// default columns.
    pub fn parse(raw: &str) -> Result<Self, SinkError> {
        match raw.split_once(':') {
            Some((table, columns)) => Self::new(
                table.trim(),
                columns
                    .split(',')
                    .map(str::trim)
                    .filter(|column| !column.is_empty()),
            ),
            None => Self::new(raw.trim(), DEFAULT_TARGET_COLUMNS),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Builds the insert for one record. Absent fields are written as a
    /// literal `NULL` so that no text-typed parameter reaches a numeric column.
    pub fn insert_statement(&self, record: &NormalizedRecord) -> (String, Vec<FieldValue>) {
        let mut placeholders = Vec::with_capacity(self.columns.len());
        let mut values = Vec::new();
        for column in &self.columns {
            match record.get(column) {
                Some(value) => {
                    values.push(value.clone());
                    placeholders.push(format!("${}", values.len()));
                }
                None => placeholders.push("NULL".to_string()),
            }
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            placeholders.join(", ")
        );
        (sql, values)
    }
}

impl Default for TargetTable {
    fn default() -> Self {
        Self {
            table: DEFAULT_TARGET_TABLE.to_string(),
            columns: DEFAULT_TARGET_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

fn validate_identifier(name: &str) -> Result<(), SinkError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SinkError::InvalidIdentifier(name.to_string()))
    }
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn insert(&self, record: &NormalizedRecord) -> Result<(), SinkError>;
}

#[derive(Clone)]
pub struct PgRecordSink {
    pool: PgPool,
    target: TargetTable,
}

impl PgRecordSink {
    pub fn new(pool: PgPool, target: TargetTable) -> Self {
        Self { pool, target }
    }

    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        target: TargetTable,
    ) -> Result<Self, SinkError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool, target))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordSink for PgRecordSink {
    async fn insert(&self, record: &NormalizedRecord) -> Result<(), SinkError> {
        let (sql, values) = self.target.insert_statement(record);
        let mut query = sqlx::query(&sql);
        for value in values {
            query = match value {
                FieldValue::Integer(v) => query.bind(v),
                FieldValue::Decimal(v) => query.bind(v),
                FieldValue::Text(v) => query.bind(v),
            };
        }
        query.execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistSummary {
    pub inserted: usize,
    pub failed: usize,
}

pub async fn persist_records(sink: &dyn RecordSink, records: &[NormalizedRecord]) -> PersistSummary {
    let mut summary = PersistSummary::default();
    for record in records {
        match sink.insert(record).await {
            Ok(()) => summary.inserted += 1,
            Err(err) => {
                warn!(line = record.line, error = %err, "skipping record that failed to insert");
                summary.failed += 1;
            }
        }
    }
    debug!(inserted = summary.inserted, failed = summary.failed, "persisted accepted records");
    summary
}
