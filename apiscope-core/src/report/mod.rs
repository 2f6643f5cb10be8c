//! Report rendering and persistence
//!
//! A report renders to exactly one of three formats:
//!
//! | Format | Extension | Content |
//! |--------|-----------|---------|
//! | [`ReportFormat::Markdown`] | `.md` | section tables with row caps |
//! | [`ReportFormat::Json`] | `.json` | the full report, uncapped |
//! | [`ReportFormat::Console`] | `.txt` | condensed plain-text digest |
//!
//! Rendering is a pure function of the report, so rendering the same report
//! twice yields identical bytes.

mod console;
mod markdown;

pub use console::render_console;
pub use markdown::render_markdown;

use crate::analysis::AnalysisReport;
use crate::error::{Error, Result};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
    Console,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "markdown",
            ReportFormat::Json => "json",
            ReportFormat::Console => "console",
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
            ReportFormat::Console => "txt",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            "console" => Ok(ReportFormat::Console),
            _ => Err(format!(
                "unknown report format: {} (expected markdown, json or console)",
                s
            )),
        }
    }
}

/// Render the full report as pretty-printed JSON.
pub fn render_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render a report in the given format.
pub fn render(report: &AnalysisReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Markdown => render_markdown(report),
        ReportFormat::Json => render_json(report),
        ReportFormat::Console => render_console(report),
    }
}

/// Render a report and write it to `path` with the format's extension.
///
/// Missing parent directories are created. Content is rendered completely
/// before anything touches the disk, then written to a temporary file beside
/// the target and renamed over it, so a failed run never leaves a partial
/// report. Returns the path actually written.
pub fn save(report: &AnalysisReport, path: &Path, format: ReportFormat) -> Result<PathBuf> {
    let content = render(report, format)?;

    let output_path = path.with_extension(format.extension());
    let write_error = |source: std::io::Error| Error::Write {
        path: output_path.clone(),
        source,
    };

    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_error)?;

    let mut staged = NamedTempFile::new_in(&parent).map_err(write_error)?;
    staged
        .write_all(content.as_bytes())
        .and_then(|_| staged.as_file().sync_all())
        .map_err(write_error)?;
    staged
        .persist(&output_path)
        .map_err(|e| write_error(e.error))?;

    tracing::info!(path = %output_path.display(), format = %format, "Report saved");
    Ok(output_path)
}

/// Escape a value for use inside a markdown table cell.
fn cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Wrap a value in a markdown code span.
///
/// The fence is one backtick longer than the longest backtick run in the
/// value, padded with spaces when the value itself contains backticks.
fn code(value: &str) -> String {
    let longest_run = value.split(|c| c != '`').map(str::len).max().unwrap_or(0);
    if longest_run == 0 {
        return format!("`{}`", value);
    }
    let fence = "`".repeat(longest_run + 1);
    format!("{} {} {}", fence, value, fence)
}
