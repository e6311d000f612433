//! Classifier — turns one raw export line into a [`ParsedRecord`].
//!
//! Detection is attempted in order: leading timestamp strip → JSON record →
//! string-tagged record → unrecognized. Nothing here performs I/O, so every
//! branch is testable on plain strings.

use crate::config::ClassifierConfig;
use crate::types::{LogFormat, LogLevel, ParsedRecord};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

/// Stems a string-tagged line must start with to be considered at all.
const LEVEL_STEMS: [&str; 4] = ["deb", "inf", "war", "err"];

static DEFAULT_CLASSIFIER: LazyLock<Classifier> = LazyLock::new(Classifier::default);

/// Outcome of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Record(ParsedRecord),
    /// The line looked structured but could not be used. Dropped, never fatal.
    Warning(ParseWarning),
    /// Blank lines, stack-trace continuations and anything else.
    Unrecognized,
}

impl Classified {
    pub fn into_record(self) -> Option<ParsedRecord> {
        match self {
            Classified::Record(record) => Some(record),
            Classified::Warning(_) | Classified::Unrecognized => None,
        }
    }
}

/// A line that carried the JSON marker but could not be aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWarning {
    #[error("invalid JSON record: {reason}")]
    InvalidJson { reason: String },

    #[error("JSON record has no string `message` field (found {found})")]
    MessageNotString { found: &'static str },
}

/// Compiled classification rules.
#[derive(Debug, Clone)]
pub struct Classifier {
    timestamp: Regex,
    json_marker: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default()).expect("built-in timestamp pattern must compile")
    }
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            timestamp: Regex::new(&config.timestamp_pattern)?,
            json_marker: config.json_marker.clone(),
        })
    }

    /// Remove the timestamp prefix (and its separator) when the line starts
    /// with one. Lines that do not match exactly are returned untouched.
    pub fn strip_timestamp<'a>(&self, line: &'a str) -> &'a str {
        match self.timestamp.find(line) {
            Some(m) if m.start() == 0 => &line[m.end()..],
            _ => line,
        }
    }

    pub fn classify(&self, line: &str) -> Classified {
        let rest = self.strip_timestamp(line);

        if rest.starts_with(&self.json_marker) {
            return match parse_json_record(rest) {
                Ok(record) => Classified::Record(record),
                Err(warning) => Classified::Warning(warning),
            };
        }

        if LEVEL_STEMS.iter().any(|stem| rest.starts_with(stem)) {
            return Classified::Record(parse_string_record(rest));
        }

        Classified::Unrecognized
    }
}

/// Classify with the built-in rules.
pub fn classify(line: &str) -> Classified {
    DEFAULT_CLASSIFIER.classify(line)
}

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

fn parse_json_record(text: &str) -> Result<ParsedRecord, ParseWarning> {
    let value: Value = serde_json::from_str(text).map_err(|e| ParseWarning::InvalidJson {
        reason: e.to_string(),
    })?;

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(ParseWarning::InvalidJson {
                reason: format!("expected an object, found {}", json_type_name(Some(&other))),
            })
        }
    };

    let level = object
        .get("level")
        .and_then(Value::as_str)
        .map(LogLevel::parse_or_unmapped)
        .unwrap_or(LogLevel::Unmapped);

    let mut message = None;
    let payload: Map<String, Value> = object
        .into_iter()
        .filter_map(|(key, value)| match key.as_str() {
            "message" => {
                message = Some(value);
                None
            }
            "timestamp" => None,
            _ => Some((key, value)),
        })
        .collect();

    let message = match message {
        Some(Value::String(message)) => message,
        other => {
            return Err(ParseWarning::MessageNotString {
                found: json_type_name(other.as_ref()),
            })
        }
    };

    Ok(ParsedRecord {
        format: LogFormat::Json,
        level,
        message,
        payload_key: Value::Object(payload).to_string(),
    })
}

fn json_type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

// ---------------------------------------------------------------------------
// String-tagged records
// ---------------------------------------------------------------------------

/// `error: Some Axios error {"success":false}` → message `error: Some Axios
/// error `, payload `{"success":false}`.
fn parse_string_record(text: &str) -> ParsedRecord {
    let (message, payload) = match text.find('{') {
        Some(brace) => text.split_at(brace),
        None => (text, ""),
    };

    let token_end = text
        .find(|c: char| c == ':' || c == '{' || c.is_whitespace())
        .unwrap_or(text.len());

    ParsedRecord {
        format: LogFormat::String,
        level: LogLevel::parse_or_unmapped(&text[..token_end]),
        message: message.to_string(),
        payload_key: payload.to_string(),
    }
}
