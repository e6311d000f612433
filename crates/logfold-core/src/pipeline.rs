//! Pipeline — folds a directory of unpacked export files into one
//! [`AggregateStore`].
//!
//! Each file is read by its own task, gated by a semaphore so that at most
//! `concurrency` files are in flight. A task classifies its lines in on-disk
//! order into a private shard; shards are merged after every task has
//! finished, in sorted file order, so the result does not depend on which
//! task completed first.

use crate::classifier::{Classified, Classifier};
use crate::store::{AggregateStats, AggregateStore};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Maximum number of files read at the same time. Zero is treated as one.
    pub concurrency: usize,
    pub classifier: Classifier,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            concurrency: 5,
            classifier: Classifier::default(),
        }
    }
}

/// Result of a completed aggregation run.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    pub store: AggregateStore,
    pub stats: AggregateStats,
    /// Files that could not be read. Their siblings were still aggregated.
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no unpacked log files found in {}", .dir.display())]
    NoInput { dir: PathBuf },

    #[error("failed to list {}: {source}", .dir.display())]
    ListDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("aggregation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A single file that could not be read.
#[derive(Debug, Error)]
#[error("failed to read {}: {source}", .path.display())]
pub struct FileFailure {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// One file's contribution before merging.
#[derive(Debug, Default)]
pub struct FileShard {
    pub store: AggregateStore,
    pub stats: AggregateStats,
}

/// Classify and aggregate every line of `text`. `origin` only labels
/// diagnostics.
pub fn fold_lines(text: &str, classifier: &Classifier, origin: &Path) -> FileShard {
    let mut shard = FileShard::default();
    shard.stats.files = 1;

    for (n, line) in text.lines().enumerate() {
        let classified = classifier.classify(line);
        shard.stats.observe(&classified);

        match classified {
            Classified::Record(record) => shard.store.aggregate(record),
            Classified::Warning(warning) => {
                tracing::warn!(
                    file = %origin.display(),
                    line = n + 1,
                    %warning,
                    "dropping unparseable line"
                );
            }
            Classified::Unrecognized => {}
        }
    }

    shard
}

async fn fold_file(path: &Path, classifier: &Classifier) -> std::io::Result<FileShard> {
    let bytes = tokio::fs::read(path).await?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(fold_lines(&text, classifier, path))
}

/// Regular files directly under `dir`, sorted by path.
pub async fn list_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let list_err = |source| PipelineError::ListDir {
        dir: dir.to_path_buf(),
        source,
    };

    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::NoInput {
                dir: dir.to_path_buf(),
            })
        }
        Err(e) => return Err(list_err(e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = read_dir.next_entry().await.map_err(list_err)? {
        if entry.file_type().await.map_err(list_err)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Aggregate every file directly under `dir`.
///
/// Fails with [`PipelineError::NoInput`] when the directory is missing or
/// holds no files. Unreadable files end up in
/// [`AggregateOutcome::failures`] without affecting the rest.
pub async fn aggregate_dir(
    dir: &Path,
    options: &AggregateOptions,
) -> Result<AggregateOutcome, PipelineError> {
    let files = list_files(dir).await?;
    if files.is_empty() {
        return Err(PipelineError::NoInput {
            dir: dir.to_path_buf(),
        });
    }

    let classifier = Arc::new(options.classifier.clone());
    let outcome = aggregate_files(files, options.concurrency, move |path| {
        let classifier = Arc::clone(&classifier);
        async move { fold_file(&path, &classifier).await }
    })
    .await?;

    tracing::info!(
        files = outcome.stats.files,
        lines = outcome.stats.lines,
        records = outcome.stats.records(),
        warnings = outcome.stats.warnings,
        unrecognized = outcome.stats.unrecognized,
        entries = outcome.store.len(),
        failed = outcome.failures.len(),
        "aggregation finished"
    );

    Ok(outcome)
}

/// Fold `files` with `fold`, at most `concurrency` at a time, and merge the
/// shards in the order of `files`.
async fn aggregate_files<F, Fut>(
    files: Vec<PathBuf>,
    concurrency: usize,
    fold: F,
) -> Result<AggregateOutcome, PipelineError>
where
    F: Fn(PathBuf) -> Fut,
    Fut: Future<Output = std::io::Result<FileShard>> + Send + 'static,
{
    let total = files.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let progress = Arc::new(AtomicUsize::new(0));

    let mut set = JoinSet::new();
    for (index, path) in files.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let progress = Arc::clone(&progress);
        let work = fold(path.clone());

        set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("aggregation semaphore is never closed");

            let result = work.await;
            let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!(file = %path.display(), "processed file {done} / {total}");

            (index, result.map_err(|source| FileFailure { path, source }))
        });
    }

    let mut slots: Vec<Option<Result<FileShard, FileFailure>>> =
        std::iter::repeat_with(|| None).take(total).collect();
    while let Some(joined) = set.join_next().await {
        let (index, result) = joined?;
        slots[index] = Some(result);
    }

    let mut outcome = AggregateOutcome::default();
    for result in slots.into_iter().flatten() {
        match result {
            Ok(shard) => {
                outcome.store.merge(shard.store);
                outcome.stats.merge(&shard.stats);
            }
            Err(failure) => {
                tracing::error!(error = %failure, "skipping unreadable file");
                outcome.failures.push(failure);
            }
        }
    }
    Ok(outcome)
}
