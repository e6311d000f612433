//! Configuration types for logfold.
//!
//! [`Config::load`] layers the built-in defaults, an optional TOML file and
//! `LOGFOLD_*` environment variables. [`Config::defaults`] returns the
//! built-in defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[pipeline]
source          = "data-input"
destination     = "data-output"
concurrency     = 5
extension       = "gz"
unpacked_folder = "unpacked"

[classifier]
timestamp_pattern = '^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z '
json_marker       = '{"level":'

[report]
folder = "reports"
pretty = true
"#;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "logfold.toml";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_source")]
    pub source: PathBuf,
    #[serde(default = "default_destination")]
    pub destination: PathBuf,
    /// Upper bound on files unpacked or aggregated at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Compression extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Subfolder of `destination` holding the decompressed files.
    #[serde(default = "default_unpacked_folder")]
    pub unpacked_folder: String,
}

fn default_source() -> PathBuf { PathBuf::from("data-input") }
fn default_destination() -> PathBuf { PathBuf::from("data-output") }
fn default_concurrency() -> usize { 5 }
fn default_extension() -> String { "gz".to_string() }
fn default_unpacked_folder() -> String { "unpacked".to_string() }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            destination: default_destination(),
            concurrency: default_concurrency(),
            extension: default_extension(),
            unpacked_folder: default_unpacked_folder(),
        }
    }
}

impl PipelineConfig {
    pub fn unpacked_dir(&self) -> PathBuf {
        self.destination.join(&self.unpacked_folder)
    }
}

/// `[classifier]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Anchored regex matching the line timestamp plus its separator.
    #[serde(default = "default_timestamp_pattern")]
    pub timestamp_pattern: String,
    /// Prefix that marks a line as a JSON record.
    #[serde(default = "default_json_marker")]
    pub json_marker: String,
}

fn default_timestamp_pattern() -> String {
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z ".to_string()
}
fn default_json_marker() -> String { r#"{"level":"#.to_string() }

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            timestamp_pattern: default_timestamp_pattern(),
            json_marker: default_json_marker(),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Subfolder of the destination receiving `<level>.json` files.
    #[serde(default = "default_report_folder")]
    pub folder: String,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_report_folder() -> String { "reports".to_string() }
fn default_pretty() -> bool { true }

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            folder: default_report_folder(),
            pretty: default_pretty(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load the built-in defaults, then `path` (or `./logfold.toml` when
    /// `None`, which may be absent), then `LOGFOLD_<SECTION>__<KEY>`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("LOGFOLD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.pipeline.concurrency > 0,
            "pipeline.concurrency must be a positive integer"
        );
        anyhow::ensure!(
            !self.pipeline.extension.is_empty(),
            "pipeline.extension must not be empty"
        );
        regex::Regex::new(&self.classifier.timestamp_pattern)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
