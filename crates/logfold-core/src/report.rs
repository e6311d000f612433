//! Report — ranked, per-level views of an [`AggregateStore`] and their
//! on-disk JSON artifacts.
//!
//! Only reportable levels (`info`, `warn`, `error`) get an artifact. Each
//! artifact is written independently; a failed write is collected and
//! returned after the remaining levels have been attempted.

use crate::store::{AggregateStats, AggregateStore};
use crate::types::{LogFormat, LogLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the run summary written next to the level reports.
pub const SUMMARY_FILE: &str = "summary.json";

// ---------------------------------------------------------------------------
// Report model
// ---------------------------------------------------------------------------

/// One ranked line of a level report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub count: u64,
    pub message: String,
    pub format: LogFormat,
    pub payloads: Vec<PayloadCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadCount {
    pub payload: String,
    pub count: u64,
}

/// All records of one level, highest count first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelReport {
    pub level: LogLevel,
    pub records: Vec<ReportRecord>,
}

impl LevelReport {
    pub fn file_name(&self) -> String {
        format!("{}.json", self.level)
    }
}

/// Per-run metadata written to [`SUMMARY_FILE`].
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entries: usize,
    pub stats: AggregateStats,
    pub failed_files: Vec<FailedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} report artifact(s) could not be written: {}", .failures.len(), join_failures(.failures))]
    Incomplete {
        written: Vec<PathBuf>,
        failures: Vec<ReportError>,
    },
}

fn join_failures(failures: &[ReportError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Rank every reportable level of `store`. Levels without entries still get
/// an (empty) report so consumers always find the same set of artifacts.
pub fn build_reports(store: &AggregateStore) -> Vec<LevelReport> {
    LogLevel::ALL
        .into_iter()
        .filter(LogLevel::is_reportable)
        .map(|level| build_level_report(store, level))
        .collect()
}

pub fn build_level_report(store: &AggregateStore, level: LogLevel) -> LevelReport {
    let mut records: Vec<ReportRecord> = store
        .entries(level)
        .iter()
        .map(|entry| ReportRecord {
            count: entry.count(),
            message: entry.message().to_string(),
            format: entry.format(),
            payloads: entry
                .payloads()
                .map(|(payload, count)| PayloadCount {
                    payload: payload.to_string(),
                    count,
                })
                .collect(),
        })
        .collect();

    // Stable: equal counts keep first-seen order.
    records.sort_by(|a, b| b.count.cmp(&a.count));

    LevelReport { level, records }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write each report to `<dir>/<level>.json`, creating `dir` if needed.
/// Returns the written paths, or [`ReportError::Incomplete`] listing every
/// level that failed.
pub async fn write_reports(
    reports: &[LevelReport],
    dir: &Path,
    pretty: bool,
) -> Result<Vec<PathBuf>, ReportError> {
    create_dir(dir).await?;

    let mut written = Vec::with_capacity(reports.len());
    let mut failures = Vec::new();

    for report in reports {
        let path = dir.join(report.file_name());
        match write_json(&path, &report.records, pretty).await {
            Ok(()) => {
                tracing::debug!(
                    level = %report.level,
                    records = report.records.len(),
                    path = %path.display(),
                    "report written"
                );
                written.push(path);
            }
            Err(e) => {
                tracing::error!(level = %report.level, error = %e, "failed to write report");
                failures.push(e);
            }
        }
    }

    if failures.is_empty() {
        Ok(written)
    } else {
        Err(ReportError::Incomplete { written, failures })
    }
}

pub async fn write_summary(
    summary: &RunSummary,
    dir: &Path,
    pretty: bool,
) -> Result<PathBuf, ReportError> {
    create_dir(dir).await?;
    let path = dir.join(SUMMARY_FILE);
    write_json(&path, summary, pretty).await?;
    Ok(path)
}

async fn create_dir(dir: &Path) -> Result<(), ReportError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ReportError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}

async fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), ReportError> {
    let encoded = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
    .map_err(|source| ReportError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    tokio::fs::write(path, encoded)
        .await
        .map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
}
