//! The `validate` command: runs the pipeline over files on disk, one after
//! another, and writes the JSON results next to them or into `--out-dir`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;
use partsclean_core::output::{derive_output_key, encode_json};
use partsclean_core::{Pipeline, PipelineStats};
use partsclean_parser::{parse_csv_bytes, CsvOptions};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub trace: Option<PathBuf>,
    pub stats: PipelineStats,
}

/// Expands glob patterns into regular files, keeping first-seen order.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        for entry in glob::glob(pattern).with_context(|| format!("invalid pattern `{pattern}`"))? {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    warn!(%pattern, error = %err, "could not read path from pattern");
                    continue;
                }
            };
            if path.is_file() && seen.insert(path.clone()) {
                matched = true;
                files.push(path);
            }
        }
        if !matched {
            warn!(%pattern, "pattern matched no files");
        }
    }
    Ok(files)
}

/// `parts.csv` -> `parts.json`, in `out_dir` when given, else beside the input.
pub fn output_path(source: &Path, out_dir: Option<&Path>) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output_name = derive_output_key(&file_name);
    match out_dir {
        Some(dir) => dir.join(output_name),
        None => source.with_file_name(output_name),
    }
}

pub fn validate_file(
    source: &Path,
    pipeline: &Pipeline,
    options: &CsvOptions,
    out_dir: Option<&Path>,
) -> Result<FileReport> {
    let bytes = fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
    let parsed = parse_csv_bytes(&bytes, options)
        .with_context(|| format!("failed to parse {}", source.display()))?;
    let report = pipeline
        .run(&parsed.header, &parsed.records)
        .with_context(|| format!("failed to clean {}", source.display()))?;

    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let output = output_path(source, out_dir);
    fs::write(&output, encode_json(&report.accepted)?)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let trace = match &report.trace {
        Some(diagnostics) => {
            let path = output.with_extension("trace.json");
            let mut body = serde_json::to_vec_pretty(diagnostics)?;
            body.push(b'\n');
            fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;
            Some(path)
        }
        None => None,
    };

    info!(
        source = %source.display(),
        output = %output.display(),
        valid = report.stats.valid,
        rejected = report.stats.rejected(),
        "validated file"
    );

    Ok(FileReport {
        source: source.to_path_buf(),
        output,
        trace,
        stats: report.stats,
    })
}

pub fn summary_table(reports: &[FileReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "File",
        "Read",
        "Valid",
        "Invalid",
        "Exact duplicates",
        "Key duplicates",
        "Output",
    ]);
    for report in reports {
        let stats = &report.stats;
        table.add_row(vec![
            report.source.display().to_string(),
            stats.read.to_string(),
            stats.valid.to_string(),
            stats.invalid.to_string(),
            stats.duplicate_exact.to_string(),
            stats.duplicate_key.to_string(),
            report.output.display().to_string(),
        ]);
    }
    table
}
