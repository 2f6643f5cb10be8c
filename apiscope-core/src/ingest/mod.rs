//! Capture log loading
//!
//! Reads a JSONL capture log into ordered request and response sequences.
//!
//! ## Design Principles
//!
//! 1. **Order preserving**: records keep the order they appear in the log
//! 2. **Resilience**: a line that is not JSON, or whose top-level fields
//!    have the wrong shape, logs a warning and is skipped. A body or header
//!    value of an unexpected shape only degrades that field
//! 3. **Bounded bodies**: text and JSON bodies above
//!    [`AnalysisConfig::max_body_size`] are cut down to truncated binary
//! 4. **Fatal only on open**: the run aborts only if the log cannot be read

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::types::{RecordKind, TransactionRecord};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Records read from one capture log.
#[derive(Debug, Default)]
pub struct LoadedLog {
    /// Request events, in log order
    pub requests: Vec<TransactionRecord>,
    /// Response events, in log order
    pub responses: Vec<TransactionRecord>,
    /// Lines that could not be parsed and were skipped
    pub skipped_lines: usize,
}

/// Load a capture log from disk with the default analysis limits.
///
/// Blank lines are ignored. Lines whose `type` is neither `request` nor
/// `response` are dropped without a warning.
pub fn load(path: &Path) -> Result<LoadedLog> {
    load_with(path, &AnalysisConfig::default())
}

/// Load a capture log, capping body sizes at `config.max_body_size`.
pub fn load_with(path: &Path, config: &AnalysisConfig) -> Result<LoadedLog> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open {}: {}", path.display(), e),
        )),
    })?;

    let reader = BufReader::new(file);
    let mut log = LoadedLog::default();

    for (index, line_result) in reader.lines().enumerate() {
        let line_number = index + 1;

        let line = match line_result {
            Ok(l) => l,
            // Invalid UTF-8 only spoils this line
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(line = line_number, error = %e, "unreadable log line, skipping");
                log.skipped_lines += 1;
                continue;
            }
            Err(e) => {
                return Err(Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to read {} at line {}: {}",
                        path.display(),
                        line_number,
                        e
                    ),
                )))
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Ok(Some(mut record)) => {
                record.body = std::mem::take(&mut record.body).enforce_limit(config.max_body_size);
                match record.kind {
                    RecordKind::Request => log.requests.push(record),
                    RecordKind::Response => log.responses.push(record),
                }
            }
            Ok(None) => {
                tracing::debug!(
                    line = line_number,
                    "log line has no request/response type, dropping"
                );
            }
            Err(e) => {
                tracing::warn!(
                    line = line_number,
                    error = %e,
                    "failed to parse log line, skipping"
                );
                log.skipped_lines += 1;
            }
        }
    }

    tracing::info!(
        path = %path.display(),
        requests = log.requests.len(),
        responses = log.responses.len(),
        skipped = log.skipped_lines,
        "Loaded {} requests and {} responses",
        log.requests.len(),
        log.responses.len()
    );

    Ok(log)
}

/// Parse one non-blank log line.
///
/// Returns `Ok(None)` for lines that are valid JSON but not a request or
/// response event.
fn parse_line(line: &str) -> std::result::Result<Option<TransactionRecord>, serde_json::Error> {
    let raw: serde_json::Value = serde_json::from_str(line)?;

    let is_transaction = raw
        .get("type")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<RecordKind>().ok())
        .is_some();
    if !is_transaction {
        return Ok(None);
    }

    serde_json::from_value(raw).map(Some)
}
