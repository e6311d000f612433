//! Core types for logfold-core.
//!
//! This module defines the values that flow between the pipeline layers: the
//! transient [`ParsedRecord`] produced by the classifier, its [`LogLevel`],
//! and the [`LogFormat`] discriminant.

use serde::{Deserialize, Serialize};

/// A classified log line, ready to be folded into an
/// [`AggregateStore`](crate::store::AggregateStore).
///
/// `message` and `payload_key` never contain the leading line timestamp or
/// the JSON `timestamp` field, so two occurrences of the same event that
/// differ only in wall-clock time produce identical records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    /// Which shape the line had.
    pub format: LogFormat,
    /// Severity, inferred from the JSON `level` field or the leading token.
    pub level: LogLevel,
    /// Aggregation template. For JSON lines this is the `message` field; for
    /// string-tagged lines it is everything before the first `{`.
    pub message: String,
    /// Canonical representation of the remaining data.
    pub payload_key: String,
}

/// Log severity level.
///
/// `Unmapped` collects lines whose level is absent or outside the known set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Unmapped,
}

impl LogLevel {
    /// Every level, in report order.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Unmapped,
    ];

    /// Case-sensitive lookup of a known level name. Returns `None` for
    /// anything outside `debug`, `info`, `warn`, `error`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Like [`LogLevel::from_name`] but falls back to `Unmapped`.
    pub fn parse_or_unmapped(name: &str) -> Self {
        Self::from_name(name).unwrap_or(LogLevel::Unmapped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Unmapped => "unmapped",
        }
    }

    /// Whether entries at this level end up in a durable report. Debug lines
    /// are noise and unmapped lines carry no usable severity.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, LogLevel::Debug | LogLevel::Unmapped)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which shape a classified line had.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// A JSON object whose first key is `level`.
    Json,
    /// `level: free text {payload}`.
    String,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::String => write!(f, "string"),
        }
    }
}
