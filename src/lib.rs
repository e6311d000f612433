//! logfold — fold gzip log exports into ranked per-level summaries.
//!
//! This crate wires the two library crates together behind the run modes
//! the binary exposes, so that integration tests can drive a whole run
//! without spawning a process.
//!
//! # Architecture
//!
//! ```text
//! *.gz ──► unpack ──► <destination>/unpacked/* ──► aggregate_dir
//!                                                      │
//!                       <destination>/reports/*.json ◄─┘
//! ```

pub use logfold_archive::{unpack, ArchiveError, UnpackFailure, UnpackOptions, UnpackReport};
pub use logfold_core::config::Config;
pub use logfold_core::pipeline::{aggregate_dir, AggregateOptions, AggregateOutcome, PipelineError};
pub use logfold_core::report::{FailedFile, RunSummary};
pub use logfold_core::{classify, Classified, LogFormat, LogLevel, ParsedRecord};

use logfold_core::report::{build_reports, write_reports, write_summary};
use logfold_core::Classifier;
use std::path::PathBuf;

/// Which stages a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RunMode {
    /// Decompress the source archive into the destination.
    Unpack,
    /// Aggregate an already unpacked destination.
    Aggregate,
    /// Unpack, then aggregate.
    All,
}

impl RunMode {
    fn unpacks(self) -> bool {
        matches!(self, RunMode::Unpack | RunMode::All)
    }

    fn aggregates(self) -> bool {
        matches!(self, RunMode::Aggregate | RunMode::All)
    }
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub unpack: Option<UnpackReport>,
    /// Archive members that could not be unpacked (`all` mode only; in
    /// `unpack` mode these fail the run).
    pub unpack_failures: Vec<FailedFile>,
    pub aggregate: Option<AggregateOutcome>,
    /// Level reports and the summary, in write order.
    pub written: Vec<PathBuf>,
}

/// Execute `mode` with the paths and limits in `config`.
///
/// In `all` mode a partially failed unpack is logged and the aggregation
/// proceeds over the files that did unpack; the failures are listed in the
/// run summary. Missing input and report write failures fail the run.
pub async fn run(mode: RunMode, config: &Config) -> anyhow::Result<RunOutcome> {
    let mut outcome = RunOutcome::default();
    let pipeline = &config.pipeline;

    if mode.unpacks() {
        let options = UnpackOptions {
            extension: pipeline.extension.clone(),
            unpacked_folder: pipeline.unpacked_folder.clone(),
            concurrency: pipeline.concurrency,
        };

        match unpack(&pipeline.source, &pipeline.destination, &options).await {
            Ok(report) => outcome.unpack = Some(report),
            Err(ArchiveError::Failed { report, failures }) if mode == RunMode::All => {
                tracing::error!(
                    failed = failures.len(),
                    unpacked = report.unpacked,
                    "some files failed to unpack; aggregating the rest"
                );
                outcome.unpack_failures = failures
                    .iter()
                    .map(|f| FailedFile {
                        path: f.path().to_path_buf(),
                        error: f.to_string(),
                    })
                    .collect();
                outcome.unpack = Some(report);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if mode.aggregates() {
        aggregate_and_report(config, &mut outcome).await?;
    }

    Ok(outcome)
}

async fn aggregate_and_report(config: &Config, outcome: &mut RunOutcome) -> anyhow::Result<()> {
    let started_at = chrono::Utc::now();

    let options = AggregateOptions {
        concurrency: config.pipeline.concurrency,
        classifier: Classifier::new(&config.classifier)?,
    };
    let aggregated = aggregate_dir(&config.pipeline.unpacked_dir(), &options).await?;

    let report_dir = config.pipeline.destination.join(&config.report.folder);
    let reports = build_reports(&aggregated.store);
    let written = write_reports(&reports, &report_dir, config.report.pretty).await;

    let mut failed_files = outcome.unpack_failures.clone();
    failed_files.extend(aggregated.failures.iter().map(|f| FailedFile {
        path: f.path.clone(),
        error: f.to_string(),
    }));
    let summary = RunSummary {
        started_at,
        finished_at: chrono::Utc::now(),
        entries: aggregated.store.len(),
        stats: aggregated.stats,
        failed_files,
    };
    let summary_path = write_summary(&summary, &report_dir, config.report.pretty).await;

    outcome.aggregate = Some(aggregated);
    outcome.written = written?;
    outcome.written.push(summary_path?);

    tracing::info!(dir = %report_dir.display(), "reports written");
    Ok(())
}
