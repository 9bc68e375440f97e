//! Pipeline orchestrator: raw rows -> normalize -> exact dedup ->
//! validate + key dedup -> statistics.
//!
//! The pipeline never touches storage. It receives an in-memory header and
//! record sequence and returns the accepted subset plus counts, and carries no
//! state between runs.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use partsclean_parser::{Header, RawRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dedup::{BusinessKey, ExactDeduplicator, KeyDeduplicator};
use crate::error::{CoreError, Result};
use crate::normalizer::{normalize, normalize_column};
use crate::profile::{RuleProfile, RuleSet};
use crate::record::NormalizedRecord;
use crate::row_validator::{validate_row, Rejection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Reading,
    Normalizing,
    Deduplicating,
    Emitting,
    Done,
}

impl PipelineStage {
    pub fn next(self) -> Self {
        match self {
            PipelineStage::Reading => PipelineStage::Normalizing,
            PipelineStage::Normalizing => PipelineStage::Deduplicating,
            PipelineStage::Deduplicating => PipelineStage::Emitting,
            PipelineStage::Emitting | PipelineStage::Done => PipelineStage::Done,
        }
    }
}

/// Decision taken for one input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reasons", rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    RejectedExactDuplicate,
    RejectedKeyDuplicate,
    RejectedInvalid(Vec<Rejection>),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDiagnostic {
    pub line: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub read: usize,
    pub valid: usize,
    pub invalid: usize,
    pub duplicate_exact: usize,
    pub duplicate_key: usize,
}

impl PipelineStats {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Accepted => self.valid += 1,
            Outcome::RejectedExactDuplicate => self.duplicate_exact += 1,
            Outcome::RejectedKeyDuplicate => self.duplicate_key += 1,
            Outcome::RejectedInvalid(_) => self.invalid += 1,
        }
    }

    pub fn rejected(&self) -> usize {
        self.invalid + self.duplicate_exact + self.duplicate_key
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub accepted: Vec<NormalizedRecord>,
    pub stats: PipelineStats,
    /// Per-row outcomes in input order, when tracing was requested.
    pub trace: Option<Vec<RowDiagnostic>>,
    pub stage: PipelineStage,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    rules: RuleSet,
    trace: bool,
}

impl Pipeline {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            trace: false,
        }
    }

    /// Compiles `profile` against the current calendar year.
    pub fn from_profile(profile: &RuleProfile) -> Result<Self> {
        let rules = profile.compile(Utc::now().year())?;
        Ok(Self::new(rules))
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn run(&self, header: &Header, records: &[RawRecord]) -> Result<PipelineReport> {
        let mut stage = PipelineStage::Reading;
        debug!(?stage, profile = self.rules.name(), rows = records.len(), "pipeline stage");
        check_structure(header, records)?;

        stage = stage.next();
        debug!(?stage, "pipeline stage");
        let normalized: Vec<NormalizedRecord> = records
            .iter()
            .map(|raw| normalize(raw, &self.rules))
            .collect();

        stage = stage.next();
        debug!(?stage, "pipeline stage");
        let mut exact = ExactDeduplicator::new();
        let mut keys = KeyDeduplicator::new();
        let mut outcomes = Vec::with_capacity(normalized.len());

        for record in &normalized {
            let outcome = if !exact.observe(record) {
                Outcome::RejectedExactDuplicate
            } else {
                let key = BusinessKey::of(record, self.rules.business_key());
                let rejections = validate_row(record, header, &self.rules);
                if !rejections.is_empty() {
                    Outcome::RejectedInvalid(rejections)
                } else if keys.register(key) {
                    Outcome::Accepted
                } else {
                    Outcome::RejectedKeyDuplicate
                }
            };
            if !outcome.is_accepted() {
                debug!(line = record.line, ?outcome, "row rejected");
            }
            outcomes.push(outcome);
        }

        stage = stage.next();
        debug!(?stage, "pipeline stage");
        let mut stats = PipelineStats {
            read: records.len(),
            ..PipelineStats::default()
        };
        let mut accepted = Vec::with_capacity(normalized.len());
        let mut trace = self.trace.then(|| Vec::with_capacity(normalized.len()));

        for (record, outcome) in normalized.into_iter().zip(outcomes) {
            stats.record(&outcome);
            if let Some(trace) = trace.as_mut() {
                trace.push(RowDiagnostic {
                    line: record.line,
                    outcome: outcome.clone(),
                });
            }
            if outcome.is_accepted() {
                accepted.push(record);
            }
        }

        stage = stage.next();
        info!(
            profile = self.rules.name(),
            read = stats.read,
            valid = stats.valid,
            invalid = stats.invalid,
            duplicate_exact = stats.duplicate_exact,
            duplicate_key = stats.duplicate_key,
            "pipeline finished"
        );

        Ok(PipelineReport {
            accepted,
            stats,
            trace,
            stage,
        })
    }
}

fn check_structure(header: &Header, records: &[RawRecord]) -> Result<()> {
    if header.is_empty() {
        return Err(CoreError::EmptyHeader);
    }
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(header.len());
    for column in header.columns() {
        if let Some(first) = seen.insert(normalize_column(column), column.as_str()) {
            return Err(CoreError::DuplicateColumn {
                column: normalize_column(column),
                first: first.to_string(),
                second: column.clone(),
            });
        }
    }
    for record in records {
        if let Some((column, _)) = record
            .fields()
            .iter()
            .find(|(column, _)| !header.contains(column))
        {
            return Err(CoreError::HeaderMismatch {
                line: record.line(),
                column: column.clone(),
            });
        }
    }
    Ok(())
}
