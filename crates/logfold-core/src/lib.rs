//! logfold-core — classification, aggregation and reporting for logfold.
//!
//! This crate holds everything between "a directory of plaintext export
//! files" and "ranked per-level JSON reports".
//!
//! # Architecture
//!
//! ```text
//! lines ──► Classifier ──► AggregateStore (one shard per file)
//!                                 │
//!                              merge ──► build_reports ──► <level>.json
//! ```
//!
//! The [`pipeline`] module drives the per-file tasks on `tokio`; every other
//! module is synchronous and free of I/O except [`report`]'s writers.

pub mod classifier;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod types;

pub use classifier::{classify, Classified, Classifier, ParseWarning};
pub use store::{AggregateEntry, AggregateStats, AggregateStore};
pub use types::{LogFormat, LogLevel, ParsedRecord};
