//! apiscope - audit captured HTTP traffic
//!
//! Loads a line-delimited capture log, runs every analysis pass over it and
//! renders the result as markdown, JSON or a console digest.

use std::path::{Path, PathBuf};

use apiscope_core::{analyze, ingest, report, Config, ReportFormat};
use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "apiscope")]
#[command(about = "Report the endpoints, auth and payloads in captured API traffic")]
#[command(version)]
struct Args {
    /// Capture log to analyze (one JSON transaction per line)
    log_file: PathBuf,

    /// Output format: markdown (default), json or console
    #[arg(short, long, default_value = "markdown")]
    format: ReportFormat,

    /// Report path; the extension is replaced to match the format.
    /// Ignored for console output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Config file to use instead of ~/.config/apiscope/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };

    // Initialize logging
    let _log_guard = apiscope_core::logging::init(&config.logging, args.verbose)
        .context("failed to initialize logging")?;

    if !args.log_file.exists() {
        anyhow::bail!("Log file not found: {}", args.log_file.display());
    }

    let log = ingest::load_with(&args.log_file, &config.analysis)
        .with_context(|| format!("failed to load {}", args.log_file.display()))?;

    if log.requests.is_empty() {
        anyhow::bail!(
            "No requests found in {} ({} responses, {} lines skipped)",
            args.log_file.display(),
            log.responses.len(),
            log.skipped_lines
        );
    }

    let analysis =
        analyze(&log.requests, &log.responses, &config.analysis).context("analysis failed")?;

    if args.format == ReportFormat::Console {
        let text = report::render(&analysis, args.format).context("failed to render report")?;
        print!("{}", text);
        return Ok(());
    }

    let target = args
        .output
        .clone()
        .unwrap_or_else(|| default_report_path(&args.log_file, args.format));
    let written = report::save(&analysis, &target, args.format)
        .with_context(|| format!("failed to save report to {}", target.display()))?;

    println!("Report saved to {}", written.display());
    Ok(())
}

/// `<log dir>/analysis_report_<log stem>.<ext>`
fn default_report_path(log_file: &Path, format: ReportFormat) -> PathBuf {
    let stem = log_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());
    let dir = log_file.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("analysis_report_{}.{}", stem, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_path() {
        assert_eq!(
            default_report_path(Path::new("/captures/requests.jsonl"), ReportFormat::Markdown),
            PathBuf::from("/captures/analysis_report_requests.md")
        );
        assert_eq!(
            default_report_path(Path::new("requests.jsonl"), ReportFormat::Json),
            PathBuf::from("analysis_report_requests.json")
        );
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["apiscope", "log.jsonl", "-f", "json", "-o", "out", "-v"]);
        assert_eq!(args.format, ReportFormat::Json);
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert!(args.verbose);

        assert!(Args::try_parse_from(["apiscope", "log.jsonl", "-f", "html"]).is_err());
    }
}
