//! Storage-triggered entry point: fetch one uploaded CSV, clean it, write the
//! accepted records back as JSON and report what happened.

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use partsclean_bucket::{BucketStore, S3BucketStore};
use partsclean_parser::{parse_csv_bytes, CsvOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::event::S3Event;
use crate::output::{derive_output_key, encode_json, JSON_CONTENT_TYPE};
use crate::pipeline::{Pipeline, PipelineStats};
use crate::profile::RuleProfile;
use crate::sink::{persist_records, PersistSummary, PgRecordSink, RecordSink};

pub const SUCCESS_MESSAGE: &str = "inventory file processed";
pub const FAILURE_MESSAGE: &str = "failed to process inventory file";

/// Everything a handler invocation needs. Built once per process and shared.
#[derive(Clone)]
pub struct HandlerContext {
    pub store: Arc<dyn BucketStore>,
    pub pipeline: Pipeline,
    pub csv_options: CsvOptions,
    pub output_bucket: Option<String>,
    pub sink: Option<Arc<dyn RecordSink>>,
}

impl HandlerContext {
    pub fn new(store: Arc<dyn BucketStore>, pipeline: Pipeline) -> Self {
        Self {
            store,
            pipeline,
            csv_options: CsvOptions::default(),
            output_bucket: None,
            sink: None,
        }
    }

    pub fn with_csv_options(mut self, csv_options: CsvOptions) -> Self {
        self.csv_options = csv_options;
        self
    }

    pub fn with_output_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.output_bucket = Some(bucket.into());
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Connects the S3 store, compiles the configured profile and, when
    /// `DATABASE_URL` is set, opens the Postgres sink.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let profile = RuleProfile::load(&config.profile)
            .with_context(|| format!("failed to load rule profile `{}`", config.profile))?;
        let pipeline = Pipeline::from_profile(&profile)?;
        let store = S3BucketStore::new(config.s3.clone())
            .await
            .context("failed to configure object storage")?;

        let mut context =
            Self::new(Arc::new(store), pipeline).with_csv_options(config.csv_options);
        context.output_bucket = config.output_bucket.clone();

        if let Some(database_url) = &config.database_url {
            let sink = PgRecordSink::connect(database_url, 5, config.target_table.clone())
                .await
                .context("failed to connect to the database")?;
            info!(table = config.target_table.table(), "relational sink enabled");
            context = context.with_sink(Arc::new(sink));
        }

        Ok(context)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub source_key: String,
    pub source_hash: String,
    #[serde(flatten)]
    pub counts: PipelineStats,
    pub processed_at: DateTime<Utc>,
    pub run_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub message: String,
    pub statistics: Statistics,
    pub results_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted: Option<PersistSummary>,
}

/// Processes the first object named by `event`. Never fails: errors become a
/// 500 response and nothing is written to the output bucket.
pub async fn handle_event(event: &S3Event, context: &HandlerContext) -> HandlerResponse {
    match process(event, context).await {
        Ok(summary) => match serde_json::to_value(&summary) {
            Ok(body) => HandlerResponse {
                status_code: 200,
                body,
            },
            Err(err) => failure(&anyhow::Error::new(err)),
        },
        Err(err) => failure(&err),
    }
}

fn failure(err: &anyhow::Error) -> HandlerResponse {
    let detail = format!("{err:#}");
    error!(error = %detail, "inventory processing failed");
    HandlerResponse {
        status_code: 500,
        body: json!({
            "error": detail,
            "message": FAILURE_MESSAGE,
        }),
    }
}

async fn process(event: &S3Event, context: &HandlerContext) -> Result<ProcessingSummary> {
    let object = event
        .first_object()
        .context("event does not reference any object")?;
    if event.records.len() > 1 {
        warn!(
            records = event.records.len(),
            "event names several objects; only the first is processed"
        );
    }

    let run_id = Uuid::new_v4();
    info!(%run_id, bucket = %object.bucket, key = %object.key, "processing inventory file");

    let raw = context
        .store
        .get_object(&object.bucket, &object.key)
        .await
        .with_context(|| format!("failed to read s3://{}/{}", object.bucket, object.key))?;
    let source_hash = blake3::hash(&raw).to_hex().to_string();

    let parsed = parse_csv_bytes(&raw, &context.csv_options)
        .with_context(|| format!("failed to parse {}", object.key))?;
    let report = context
        .pipeline
        .run(&parsed.header, &parsed.records)
        .with_context(|| format!("failed to clean {}", object.key))?;

    let output_bucket = context
        .output_bucket
        .clone()
        .unwrap_or_else(|| object.bucket.clone());
    let output_key = derive_output_key(&object.key);
    let body = encode_json(&report.accepted)?;
    context
        .store
        .put_object(&output_bucket, &output_key, Bytes::from(body), JSON_CONTENT_TYPE)
        .await
        .with_context(|| format!("failed to write s3://{output_bucket}/{output_key}"))?;

    let persisted = match &context.sink {
        Some(sink) => Some(persist_records(sink.as_ref(), &report.accepted).await),
        None => None,
    };

    info!(
        %run_id,
        read = report.stats.read,
        valid = report.stats.valid,
        rejected = report.stats.rejected(),
        "inventory file processed"
    );

    Ok(ProcessingSummary {
        message: SUCCESS_MESSAGE.to_string(),
        statistics: Statistics {
            source_key: object.key,
            source_hash,
            counts: report.stats,
            processed_at: Utc::now(),
            run_id,
        },
        results_location: format!("s3://{output_bucket}/{output_key}"),
        persisted,
    })
}
