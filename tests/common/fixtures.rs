//! Static log corpora used across harnesses.
//!
//! Lines mirror what a CloudWatch Logs export contains: an ISO timestamp,
//! one space, then either a winston-style JSON object or a
//! `level: message {payload}` string.

/// JSON lines, all timestamp-prefixed.
pub const CORPUS_JSON: &[&str] = &[
    r#"2024-06-08T13:18:35.987Z {"level":"info","message":"Processing something","timestamp":"2024-06-08 13:18:35"}"#,
    r#"2024-06-08T13:18:36.001Z {"level":"info","message":"Processing something","timestamp":"2024-06-08 13:18:36"}"#,
    r#"2024-06-08T13:18:36.120Z {"level":"warn","message":"Slow query","durationMs":4200,"timestamp":"2024-06-08 13:18:36"}"#,
    r#"2024-06-08T13:18:37.450Z {"level":"error","message":"Payment failed","gateway":"stripe","attempt":3,"timestamp":"2024-06-08 13:18:37"}"#,
    r#"2024-06-08T13:18:38.000Z {"level":"debug","message":"Cache miss","key":"user:42","timestamp":"2024-06-08 13:18:38"}"#,
];

/// String-tagged lines.
pub const CORPUS_STRING: &[&str] = &[
    r#"2024-06-08T13:18:35.987Z error: Some Axios error {"success":false}"#,
    r#"2024-06-08T13:18:36.987Z error: Some Axios error {"success":false}"#,
    r#"2024-06-08T13:18:37.987Z warn: Some Axios error {"success":false}"#,
    r#"2024-06-08T13:18:38.987Z info: Job finished {"jobId":"a1"}"#,
    r#"2024-06-08T13:18:39.987Z debug: Some Axios error {"axiosErrorData":{"data":{"error_status_code":"SomeError","message":"Unexpected error","source":"some_service"},"success":false},"label":"some/path"}"#,
];

/// Lines that must never produce a record.
pub const CORPUS_NOISE: &[&str] = &[
    "",
    "2024-06-08T13:18:35.987Z START RequestId: 8c1f Version: $LATEST",
    "    at processTicksAndRejections (node:internal/process/task_queues:95:5)",
    "2024-06-08T13:18:35.987Z ERROR: upper-case prefixes are not levels {}",
    "2024-06-08T13:18:35Z info: timestamp without milliseconds {}",
];

/// Lines that look structured but must be dropped with a warning.
pub const CORPUS_MALFORMED: &[&str] = &[
    r#"2024-06-08T13:18:35.987Z {"level":"info","message":"truncated"#,
    r#"2024-06-08T13:18:35.987Z {"level":"info","message":42}"#,
    r#"2024-06-08T13:18:35.987Z {"level":"info","msg":"wrong key"}"#,
];

/// Every corpus concatenated, in declaration order.
pub fn corpus_mixed() -> Vec<&'static str> {
    CORPUS_JSON
        .iter()
        .chain(CORPUS_STRING)
        .chain(CORPUS_NOISE)
        .chain(CORPUS_MALFORMED)
        .copied()
        .collect()
}

/// `n` copies of the same JSON event, each with a different timestamp.
pub fn repeated_event(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            format!(
                r#"2024-06-08T13:{:02}:{:02}.{:03}Z {{"level":"info","message":"Processing something","timestamp":"2024-06-08 13:{:02}:{:02}"}}"#,
                i / 60 % 60,
                i % 60,
                i % 1000,
                i / 60 % 60,
                i % 60,
            )
        })
        .collect()
}

/// Generate `n` synthetic lines across levels and both formats.
pub fn corpus_high_volume(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let level = match i % 10 {
                0 => "error",
                1 | 2 => "warn",
                3 => "debug",
                _ => "info",
            };
            if i % 2 == 0 {
                format!(
                    r#"2024-06-08T13:18:{:02}.{:03}Z {{"level":"{level}","message":"template {}","seq":{},"timestamp":"x"}}"#,
                    i % 60,
                    i % 1000,
                    i % 7,
                    i % 3,
                )
            } else {
                format!(
                    r#"2024-06-08T13:18:{:02}.{:03}Z {level}: template {} {{"seq":{}}}"#,
                    i % 60,
                    i % 1000,
                    i % 7,
                    i % 3,
                )
            }
        })
        .collect()
}
