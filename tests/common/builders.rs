//! Test builders — throwaway export directories and pre-filled stores.
//!
//! These are designed for readability in test assertions, not for
//! production use. They panic on I/O errors rather than returning `Result`.

use flate2::write::GzEncoder;
use flate2::Compression;
use logfold::{Config, LogLevel};
use logfold_core::AggregateStore;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// ExportDir
// ---------------------------------------------------------------------------

/// A temporary `input/` tree of gzip files plus an `output/` destination.
///
/// ```rust
/// let export = ExportDir::new();
/// export.gz("2024/06/stream-1/000000.gz", CORPUS_JSON);
/// let config = export.config(2);
/// ```
pub struct ExportDir {
    _root: TempDir,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl ExportDir {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create tempdir");
        let source = root.path().join("input");
        let destination = root.path().join("output");
        std::fs::create_dir_all(&source).expect("create source dir");
        Self {
            _root: root,
            source,
            destination,
        }
    }

    /// Write `lines` gzip-compressed to `source/<relative>`, one per line.
    pub fn gz<S: AsRef<str>>(&self, relative: &str, lines: &[S]) -> PathBuf {
        let text: String = lines.iter().map(|l| format!("{}\n", l.as_ref())).collect();
        self.write_raw(relative, &gzip_bytes(text.as_bytes()))
    }

    /// Write bytes without a gzip header.
    pub fn corrupt(&self, relative: &str) -> PathBuf {
        self.write_raw(relative, b"info: plain text where gzip was expected {}\n")
    }

    pub fn write_raw(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.source.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, bytes).expect("write fixture file");
        path
    }

    /// Default config pointed at this export.
    pub fn config(&self, concurrency: usize) -> Config {
        let mut config = Config::defaults();
        config.pipeline.source = self.source.clone();
        config.pipeline.destination = self.destination.clone();
        config.pipeline.concurrency = concurrency;
        config
    }

    pub fn unpacked_dir(&self) -> PathBuf {
        self.destination.join("unpacked")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.destination.join("reports")
    }

    /// Parsed `<level>.json` report.
    pub fn report(&self, level: LogLevel) -> serde_json::Value {
        read_json(&self.reports_dir().join(format!("{level}.json")))
    }

    pub fn summary(&self) -> serde_json::Value {
        read_json(&self.reports_dir().join("summary.json"))
    }

    /// Sorted file names in the unpacked folder.
    pub fn unpacked_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.unpacked_dir())
            .expect("read unpacked dir")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("parse {}: {e}", path.display()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn gzip_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).expect("gzip in memory");
    encoder.finish().expect("finish gzip")
}

/// Classify and aggregate `lines` in order, dropping anything that is not a
/// record.
pub fn store_from_lines<S: AsRef<str>>(lines: &[S]) -> AggregateStore {
    let mut store = AggregateStore::new();
    for line in lines {
        if let Some(record) = logfold::classify(line.as_ref()).into_record() {
            store.aggregate(record);
        }
    }
    store
}
