//! Store — per-level, per-message occurrence counts with payload variants.
//!
//! Every map here remembers insertion order, because report ties are broken
//! by first appearance. A store is owned by exactly one file worker at a
//! time; workers build their own shard and the pipeline folds the shards
//! together with [`AggregateStore::merge`].

use crate::classifier::Classified;
use crate::types::{LogFormat, LogLevel, ParsedRecord};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

// ---------------------------------------------------------------------------
// AggregateEntry
// ---------------------------------------------------------------------------

/// Accumulated occurrences of one message template at one level.
///
/// `count` always equals the sum of the payload counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateEntry {
    count: u64,
    message: String,
    format: LogFormat,
    payloads: Vec<(String, u64)>,
    payload_index: HashMap<String, usize>,
}

impl AggregateEntry {
    fn new(message: String, format: LogFormat) -> Self {
        Self {
            count: 0,
            message,
            format,
            payloads: Vec::new(),
            payload_index: HashMap::new(),
        }
    }

    fn add(&mut self, payload_key: &str, n: u64) {
        self.count += n;
        match self.payload_index.get(payload_key) {
            Some(&i) => self.payloads[i].1 += n,
            None => {
                self.payload_index
                    .insert(payload_key.to_string(), self.payloads.len());
                self.payloads.push((payload_key.to_string(), n));
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Format of the most recent occurrence.
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Payload variants in order of first occurrence.
    pub fn payloads(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.payloads.iter().map(|(k, c)| (k.as_str(), *c))
    }

    pub fn payload_count(&self, payload_key: &str) -> Option<u64> {
        self.payload_index
            .get(payload_key)
            .map(|&i| self.payloads[i].1)
    }

    pub fn variant_count(&self) -> usize {
        self.payloads.len()
    }
}

// ---------------------------------------------------------------------------
// AggregateStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LevelBucket {
    entries: Vec<AggregateEntry>,
    index: HashMap<String, usize>,
}

impl LevelBucket {
    fn entry(&mut self, message: &str, format: LogFormat) -> &mut AggregateEntry {
        let i = match self.index.get(message) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(message.to_string(), i);
                self.entries.push(AggregateEntry::new(message.to_string(), format));
                i
            }
        };
        &mut self.entries[i]
    }
}

/// level → message → [`AggregateEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStore {
    levels: BTreeMap<LogLevel, LevelBucket>,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record in: bump the entry count and its payload bucket, and
    /// remember the format (last write wins).
    pub fn aggregate(&mut self, record: ParsedRecord) {
        let entry = self
            .levels
            .entry(record.level)
            .or_default()
            .entry(&record.message, record.format);

        if entry.format != record.format {
            tracing::debug!(
                level = %record.level,
                message = %record.message,
                previous = %entry.format,
                current = %record.format,
                "message seen in more than one format"
            );
            entry.format = record.format;
        }

        entry.add(&record.payload_key, 1);
    }

    /// Add every entry of `other` into `self`: counts are summed, payload
    /// buckets are unioned with summed counts. Entries new to `self` are
    /// appended in `other`'s order.
    pub fn merge(&mut self, other: AggregateStore) {
        for (level, bucket) in other.levels {
            let target = self.levels.entry(level).or_default();
            for entry in bucket.entries {
                let merged = target.entry(&entry.message, entry.format);
                merged.format = entry.format;
                for (payload_key, n) in &entry.payloads {
                    merged.add(payload_key, *n);
                }
            }
        }
    }

    pub fn get(&self, level: LogLevel, message: &str) -> Option<&AggregateEntry> {
        let bucket = self.levels.get(&level)?;
        bucket.index.get(message).map(|&i| &bucket.entries[i])
    }

    /// Entries of one level in insertion order.
    pub fn entries(&self, level: LogLevel) -> &[AggregateEntry] {
        self.levels
            .get(&level)
            .map(|b| b.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Levels that have at least one entry.
    pub fn levels(&self) -> impl Iterator<Item = LogLevel> + '_ {
        self.levels
            .iter()
            .filter(|(_, b)| !b.entries.is_empty())
            .map(|(level, _)| *level)
    }

    /// Number of distinct (level, message) pairs.
    pub fn len(&self) -> usize {
        self.levels.values().map(|b| b.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all entry counts.
    pub fn total_count(&self) -> u64 {
        self.levels
            .values()
            .flat_map(|b| b.entries.iter())
            .map(|e| e.count)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// AggregateStats
// ---------------------------------------------------------------------------

/// Line-level counters for one run, so a rising unparsed rate is visible
/// without failing the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub files: u64,
    pub lines: u64,
    pub json_records: u64,
    pub string_records: u64,
    pub unrecognized: u64,
    pub warnings: u64,
}

impl AggregateStats {
    pub fn observe(&mut self, classified: &Classified) {
        self.lines += 1;
        match classified {
            Classified::Record(r) => match r.format {
                LogFormat::Json => self.json_records += 1,
                LogFormat::String => self.string_records += 1,
            },
            Classified::Warning(_) => self.warnings += 1,
            Classified::Unrecognized => self.unrecognized += 1,
        }
    }

    pub fn merge(&mut self, other: &AggregateStats) {
        self.files += other.files;
        self.lines += other.lines;
        self.json_records += other.json_records;
        self.string_records += other.string_records;
        self.unrecognized += other.unrecognized;
        self.warnings += other.warnings;
    }

    pub fn records(&self) -> u64 {
        self.json_records + self.string_records
    }
}
