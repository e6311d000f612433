//! logfold-archive — unpacks a gzip log export into a flat working directory.
//!
//! [`unpack`] discovers every `*.<extension>` file below the source, resets
//! the destination, then decompresses the files on blocking threads with at
//! most `concurrency` in flight. One file failing never cancels the others;
//! failures are collected and reported once every file has been attempted.

mod discover;
mod error;
mod gunzip;

pub use discover::{discover, flatten_name, output_names, resolve_glob, Discovered};
pub use error::{ArchiveError, UnpackFailure};
pub use gunzip::gunzip_file;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// Compression extension, without the dot.
    pub extension: String,
    /// Subfolder of the destination that receives the decompressed files.
    pub unpacked_folder: String,
    pub concurrency: usize,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            extension: "gz".to_string(),
            unpacked_folder: "unpacked".to_string(),
            concurrency: 5,
        }
    }
}

/// What an unpack run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackReport {
    pub discovered: usize,
    pub unpacked: usize,
    /// Entries below the source that discovery could not read.
    pub unreadable: usize,
    pub bytes_written: u64,
    /// Directory holding the decompressed files.
    pub output_dir: PathBuf,
}

/// Unpack every archive below `source` into `destination/<unpacked_folder>`.
///
/// Discovery happens before the destination is touched: when nothing
/// matches, [`ArchiveError::NotFound`] is returned and no file is written.
/// Otherwise the destination is removed and recreated, so runs are never
/// incremental. Every input gets its own output file; colliding flattened
/// names are suffixed with `_<n>`.
pub async fn unpack(
    source: &Path,
    destination: &Path,
    options: &UnpackOptions,
) -> Result<UnpackReport, ArchiveError> {
    let Discovered { files, unreadable } = discover(source, &options.extension)?;
    if files.is_empty() && unreadable.is_empty() {
        return Err(ArchiveError::NotFound {
            dir: source.to_path_buf(),
            extension: options.extension.clone(),
        });
    }

    let output_dir = reset_destination(destination, &options.unpacked_folder).await?;
    tracing::debug!(destination = %destination.display(), "output folder has been reset");

    let names = output_names(source, &files, &options.extension);
    let jobs: Vec<(PathBuf, PathBuf)> = files
        .into_iter()
        .zip(names)
        .map(|(file, name)| {
            let target = output_dir.join(name);
            (file, target)
        })
        .collect();

    let mut report = UnpackReport {
        discovered: jobs.len(),
        unreadable: unreadable.len(),
        output_dir,
        ..UnpackReport::default()
    };
    let mut failures = unreadable;

    for result in run_bounded(jobs, options.concurrency, gunzip_file).await? {
        match result {
            Ok(bytes) => {
                report.unpacked += 1;
                report.bytes_written += bytes;
            }
            Err(failure) => {
                tracing::error!(error = %failure, "failed to unpack file");
                failures.push(failure);
            }
        }
    }

    if failures.is_empty() {
        tracing::info!(
            files = report.unpacked,
            bytes = report.bytes_written,
            "unpack finished"
        );
        Ok(report)
    } else {
        failures.sort_by(|a, b| a.path().cmp(b.path()));
        Err(ArchiveError::Failed { report, failures })
    }
}

/// Run `job(source, target)` on blocking threads for every pair, with at
/// most `concurrency` in flight. Results come back in completion order.
async fn run_bounded<F>(
    jobs: Vec<(PathBuf, PathBuf)>,
    concurrency: usize,
    job: F,
) -> Result<Vec<Result<u64, UnpackFailure>>, ArchiveError>
where
    F: Fn(&Path, &Path) -> Result<u64, UnpackFailure> + Send + Sync + 'static,
{
    let total = jobs.len();
    let job = Arc::new(job);
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let progress = Arc::new(AtomicUsize::new(0));

    let mut set = JoinSet::new();
    for (file, target) in jobs {
        let job = Arc::clone(&job);
        let semaphore = Arc::clone(&semaphore);
        let progress = Arc::clone(&progress);

        set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("unpack semaphore is never closed");

            let result = tokio::task::spawn_blocking(move || (*job)(&file, &target)).await;
            if matches!(result, Ok(Ok(_))) {
                let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!("unpacked file {done} of {total}");
            }
            result
        });
    }

    let mut results = Vec::with_capacity(total);
    while let Some(joined) = set.join_next().await {
        results.push(joined??);
    }
    Ok(results)
}

async fn reset_destination(destination: &Path, unpacked_folder: &str) -> Result<PathBuf, ArchiveError> {
    let reset_err = |source| ArchiveError::ResetDestination {
        path: destination.to_path_buf(),
        source,
    };

    match tokio::fs::remove_dir_all(destination).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(reset_err(e)),
    }

    let output_dir = destination.join(unpacked_folder);
    tokio::fs::create_dir_all(&output_dir).await.map_err(reset_err)?;
    Ok(output_dir)
}
