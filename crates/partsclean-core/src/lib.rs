pub mod dedup;
pub mod error;
pub mod normalizer;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod record;
pub mod row_validator;
pub mod validators;

#[cfg(feature = "runtime")]
pub mod config;
#[cfg(feature = "runtime")]
pub mod event;
#[cfg(feature = "runtime")]
pub mod handler;
#[cfg(feature = "runtime")]
pub mod sink;

pub use error::{CoreError, Result};
pub use partsclean_parser::{Header, RawRecord};
pub use pipeline::{Outcome, Pipeline, PipelineReport, PipelineStage, PipelineStats, RowDiagnostic};
pub use profile::{RuleProfile, RuleSet};
pub use record::{FieldValue, NormalizedRecord};
