//! Domain-specific assertion macros for logfold harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that name the
//! (level, message) pair that broke.

/// Assert that a store holds an entry with the given total count.
///
/// ```rust
/// assert_entry_count!(store, LogLevel::Info, "Processing something", 3);
/// ```
#[macro_export]
macro_rules! assert_entry_count {
    ($store:expr, $level:expr, $message:expr, $count:expr) => {{
        let store: &logfold_core::AggregateStore = &$store;
        let level: logfold_core::LogLevel = $level;
        let message: &str = $message;
        match store.get(level, message) {
            Some(entry) => pretty_assertions::assert_eq!(
                entry.count(),
                $count,
                "count of [{}] {:?}",
                level,
                message
            ),
            None => panic!(
                "assert_entry_count! failed: no entry [{}] {:?}.\n  Present: {:?}",
                level,
                message,
                store
                    .entries(level)
                    .iter()
                    .map(|e| e.message())
                    .collect::<Vec<_>>()
            ),
        }
    }};
}

/// Assert `count == sum(payloads)` for every entry of every level.
#[macro_export]
macro_rules! assert_counts_conserved {
    ($store:expr) => {{
        let store: &logfold_core::AggregateStore = &$store;
        for level in logfold_core::LogLevel::ALL {
            for entry in store.entries(level) {
                let sum: u64 = entry.payloads().map(|(_, c)| c).sum();
                assert_eq!(
                    entry.count(),
                    sum,
                    "assert_counts_conserved! failed for [{}] {:?}",
                    level,
                    entry.message()
                );
            }
        }
    }};
}

/// Assert that a parsed report array is sorted by descending `count`.
#[macro_export]
macro_rules! assert_report_ranked {
    ($report:expr) => {{
        let report: &serde_json::Value = &$report;
        let counts: Vec<u64> = report
            .as_array()
            .expect("report must be a JSON array")
            .iter()
            .map(|r| r["count"].as_u64().expect("count must be an integer"))
            .collect();
        assert!(
            counts.windows(2).all(|w| w[0] >= w[1]),
            "assert_report_ranked! failed: counts not descending: {:?}",
            counts
        );
    }};
}
