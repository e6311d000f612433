use crate::UnpackReport;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    // Discovery
    #[error("no *.{extension} files found in {}", .dir.display())]
    NotFound { dir: PathBuf, extension: String },

    #[error("glob pattern error: {pattern}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    // Destination
    #[error("failed to reset destination {}: {source}", .path.display())]
    ResetDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Workers
    #[error(
        "{} of {} file(s) failed to unpack: {}",
        .failures.len(),
        .report.discovered + .report.unreadable,
        join_failures(.failures)
    )]
    Failed {
        report: UnpackReport,
        failures: Vec<UnpackFailure>,
    },

    #[error("unpack task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Why a single archive member could not be unpacked.
#[derive(Debug, Error)]
pub enum UnpackFailure {
    #[error("failed to read {} during discovery: {source}", .path.display())]
    Discover {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decompress {}: {source}", .path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UnpackFailure {
    /// The path the failure is about: the unreadable entry for discovery
    /// failures, the archive for open/decompress failures, the output file
    /// otherwise.
    pub fn path(&self) -> &std::path::Path {
        match self {
            UnpackFailure::Discover { path, .. }
            | UnpackFailure::Open { path, .. }
            | UnpackFailure::Create { path, .. }
            | UnpackFailure::Decompress { path, .. }
            | UnpackFailure::Write { path, .. } => path,
        }
    }
}

fn join_failures(failures: &[UnpackFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
