//! Plain-text digest for terminal output.

use crate::analysis::AnalysisReport;
use crate::error::Result;
use std::fmt::Write;

const RULE_WIDTH: usize = 80;
const MAX_ENDPOINTS: usize = 10;

pub fn render_console(report: &AnalysisReport) -> Result<String> {
    let rule = "=".repeat(RULE_WIDTH);
    let summary = &report.summary;
    let mut out = String::new();

    writeln!(out, "{}", rule)?;
    writeln!(out, "API Traffic Analysis")?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;
    writeln!(out, "Total requests:  {}", summary.total_requests)?;
    writeln!(out, "Total responses: {}", summary.total_responses)?;

    if !summary.methods.is_empty() {
        writeln!(out)?;
        writeln!(out, "Methods:")?;
        for (method, count) in summary.methods.most_frequent() {
            writeln!(out, "  {:<8} {}", method, count)?;
        }
    }

    if !summary.hosts.is_empty() {
        writeln!(out)?;
        writeln!(out, "Hosts:")?;
        for (host, count) in summary.hosts.most_frequent() {
            writeln!(out, "  {:<40} {}", host, count)?;
        }
    }

    if !report.endpoints.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "Top endpoints ({} of {}):",
            report.endpoints.len().min(MAX_ENDPOINTS),
            report.endpoints.len()
        )?;
        for endpoint in report.endpoints.iter().take(MAX_ENDPOINTS) {
            writeln!(
                out,
                "  {:>5}  {:<7} {}",
                endpoint.count, endpoint.method, endpoint.path
            )?;
        }
    }

    let auth = &report.auth_headers;
    if !auth.headers_found.is_empty() {
        writeln!(out)?;
        writeln!(out, "Auth headers:")?;
        for (bucket, count) in auth.headers_found.most_frequent() {
            writeln!(out, "  {:<14} {}", bucket.label(), count)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "AI requests:     {}", report.ai_requests.count)?;
    writeln!(
        out,
        "Header tokens:   {}",
        report.token_locations.header_tokens
    )?;
    writeln!(out, "Body tokens:     {}", report.token_locations.body_tokens)?;
    writeln!(out, "{}", rule)?;

    Ok(out)
}
