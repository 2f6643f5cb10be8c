//! Markdown report: one section per analysis pass, with row caps.

use super::{cell, code};
use crate::analysis::{AnalysisReport, AuthBucket, Tally};
use crate::error::Result;
use std::fmt::Write;
use std::hash::Hash;

const MAX_ENDPOINT_ROWS: usize = 50;
const MAX_FIELD_ROWS: usize = 20;
const MAX_JSON_EXAMPLES: usize = 3;
const MAX_AI_ROWS: usize = 20;
const MAX_AUTH_EXAMPLES: usize = 3;
const MAX_TOKEN_ROWS: usize = 10;

/// Render the report as markdown.
///
/// Sections and sub-sections without data are left out, headings included.
pub fn render_markdown(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "# API Traffic Analysis Report")?;
    writeln!(out)?;
    writeln!(
        out,
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out)?;

    write_summary(&mut out, report)?;
    write_endpoints(&mut out, report)?;
    write_auth_headers(&mut out, report)?;
    write_request_bodies(&mut out, report)?;
    write_ai_requests(&mut out, report)?;
    write_token_locations(&mut out, report)?;

    Ok(out)
}

/// Two-column distribution table, most frequent first.
fn write_distribution<K, F>(
    out: &mut String,
    heading: &str,
    columns: (&str, &str),
    tally: &Tally<K>,
    label: F,
) -> std::fmt::Result
where
    K: Eq + Hash + Clone,
    F: Fn(&K) -> String,
{
    if tally.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", heading)?;
    writeln!(out)?;
    writeln!(out, "| {} | {} |", columns.0, columns.1)?;
    writeln!(out, "|---|---|")?;
    for (key, count) in tally.most_frequent() {
        writeln!(out, "| {} | {} |", cell(&label(key)), count)?;
    }
    writeln!(out)
}

fn write_summary(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    let summary = &report.summary;

    writeln!(out, "## Summary")?;
    writeln!(out)?;
    writeln!(out, "- Total requests: {}", summary.total_requests)?;
    writeln!(out, "- Total responses: {}", summary.total_responses)?;
    writeln!(out)?;

    write_distribution(
        out,
        "### Request Methods",
        ("Method", "Count"),
        &summary.methods,
        |m| m.clone(),
    )?;
    write_distribution(
        out,
        "### Hosts",
        ("Host", "Requests"),
        &summary.hosts,
        |h| h.clone(),
    )?;
    write_distribution(
        out,
        "### Response Status Codes",
        ("Status", "Count"),
        &summary.status_codes,
        |s| s.to_string(),
    )
}

fn write_endpoints(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    if report.endpoints.is_empty() {
        return Ok(());
    }

    writeln!(out, "## API Endpoints")?;
    writeln!(out)?;
    writeln!(out, "| Method | Path | Host | Requests | Status Codes |")?;
    writeln!(out, "|--------|------|------|----------|--------------|")?;
    for endpoint in report.endpoints.iter().take(MAX_ENDPOINT_ROWS) {
        let mut codes: Vec<_> = endpoint.status_codes.iter().collect();
        codes.sort_by_key(|(code, _)| **code);
        let status = codes
            .iter()
            .map(|(code, count)| format!("{}({})", code, count))
            .collect::<Vec<_>>()
            .join(", ");

        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            cell(&endpoint.method),
            code(&cell(&endpoint.path)),
            cell(&endpoint.host),
            endpoint.count,
            status
        )?;
    }
    if report.endpoints.len() > MAX_ENDPOINT_ROWS {
        writeln!(out)?;
        writeln!(
            out,
            "*{} more endpoints not shown*",
            report.endpoints.len() - MAX_ENDPOINT_ROWS
        )?;
    }
    writeln!(out)
}

fn write_auth_headers(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    let auth = &report.auth_headers;
    if auth.is_empty() {
        return Ok(());
    }

    writeln!(out, "## Authentication Headers")?;
    writeln!(out)?;

    write_distribution(
        out,
        "### Headers Found",
        ("Header", "Occurrences"),
        &auth.headers_found,
        |b: &AuthBucket| b.label().to_string(),
    )?;
    write_distribution(
        out,
        "### Authorization Formats",
        ("Format", "Count"),
        &auth.auth_formats,
        |f| f.label().to_string(),
    )?;

    writeln!(out, "### Examples")?;
    writeln!(out)?;
    for (bucket, hits) in &auth.details {
        if hits.is_empty() {
            continue;
        }
        writeln!(out, "#### {}", bucket.label())?;
        writeln!(out)?;
        for (i, hit) in hits.iter().take(MAX_AUTH_EXAMPLES).enumerate() {
            writeln!(out, "{}. URL: {}", i + 1, code(&hit.url))?;
            writeln!(out, "   Value preview: {}", code(&hit.value_preview))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_request_bodies(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    let bodies = &report.request_bodies;
    if bodies.total_with_body == 0 && bodies.empty_bodies == 0 {
        return Ok(());
    }

    writeln!(out, "## Request Bodies")?;
    writeln!(out)?;
    writeln!(out, "- Requests with a body: {}", bodies.total_with_body)?;
    writeln!(out, "- Empty bodies: {}", bodies.empty_bodies)?;
    writeln!(out, "- JSON bodies: {}", bodies.json_bodies_count)?;
    writeln!(out, "- Text bodies: {}", bodies.text_bodies_count)?;
    writeln!(out)?;

    if !bodies.common_fields.is_empty() {
        writeln!(out, "### Common Fields")?;
        writeln!(out)?;
        writeln!(out, "Top-level fields only.")?;
        writeln!(out)?;
        writeln!(out, "| Field | Occurrences |")?;
        writeln!(out, "|-------|-------------|")?;
        for (field, count) in bodies.common_fields.iter().take(MAX_FIELD_ROWS) {
            writeln!(out, "| {} | {} |", code(&cell(field)), count)?;
        }
        writeln!(out)?;
    }

    if !bodies.json_examples.is_empty() {
        writeln!(out, "### JSON Body Examples")?;
        writeln!(out)?;
        for (i, example) in bodies.json_examples.iter().take(MAX_JSON_EXAMPLES).enumerate() {
            let schema =
                serde_json::to_string_pretty(&example.schema).map_err(|_| std::fmt::Error)?;
            writeln!(out, "#### Example {}", i + 1)?;
            writeln!(out)?;
            writeln!(out, "URL: {}", code(&example.url))?;
            writeln!(out, "Method: {}", example.method)?;
            writeln!(out)?;
            writeln!(out, "```json")?;
            writeln!(out, "{}", schema)?;
            writeln!(out, "```")?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_ai_requests(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    let ai = &report.ai_requests;
    if ai.count == 0 {
        return Ok(());
    }

    writeln!(out, "## AI Requests")?;
    writeln!(out)?;
    writeln!(out, "- AI-related requests: {}", ai.count)?;
    writeln!(out)?;
    writeln!(out, "| Method | Path | URL |")?;
    writeln!(out, "|--------|------|-----|")?;
    for req in ai.requests.iter().take(MAX_AI_ROWS) {
        writeln!(
            out,
            "| {} | {} | {} |",
            cell(&req.method),
            code(&cell(&req.path)),
            code(&cell(&req.url))
        )?;
    }
    writeln!(out)
}

fn write_token_locations(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    let tokens = &report.token_locations;
    if tokens.header_tokens == 0 && tokens.body_tokens == 0 {
        return Ok(());
    }

    writeln!(out, "## Token Locations")?;
    writeln!(out)?;
    writeln!(out, "- Tokens in headers: {}", tokens.header_tokens)?;
    writeln!(out, "- Tokens in request bodies: {}", tokens.body_tokens)?;
    writeln!(out)?;

    if !tokens.details.headers.is_empty() {
        writeln!(out, "### Header Tokens")?;
        writeln!(out)?;
        writeln!(out, "| Header | Method | URL |")?;
        writeln!(out, "|--------|--------|-----|")?;
        for hit in tokens.details.headers.iter().take(MAX_TOKEN_ROWS) {
            writeln!(
                out,
                "| {} | {} | {} |",
                cell(&hit.header),
                cell(&hit.method),
                code(&cell(&hit.url))
            )?;
        }
        writeln!(out)?;
    }

    if !tokens.details.body.is_empty() {
        writeln!(out, "### Body Tokens")?;
        writeln!(out)?;
        writeln!(out, "| Field | Method | URL |")?;
        writeln!(out, "|-------|--------|-----|")?;
        for hit in tokens.details.body.iter().take(MAX_TOKEN_ROWS) {
            writeln!(
                out,
                "| {} | {} | {} |",
                code(&cell(&hit.field)),
                cell(&hit.method),
                code(&cell(&hit.url))
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::body::BodyPayload;
    use crate::config::AnalysisConfig;
    use crate::report::tests::sample_report;
    use crate::types::TransactionRecord;
    use serde_json::json;

    #[test]
    fn test_sections_present() {
        let md = render_markdown(&sample_report()).unwrap();

        assert!(md.starts_with("# API Traffic Analysis Report\n"));
        assert!(md.contains("- Total requests: 3"));
        assert!(md.contains("| GET | `/a` | api.example.com | 2 | 200(1), 304(1) |"));
        assert!(md.contains("| Authorization | 1 |"));
        assert!(md.contains("| Bearer Token | 1 |"));
        assert!(md.contains("   Value preview: `Bearer secret-token`"));
        assert!(md.contains("#### Example 1"));
        assert!(md.contains("\"role\": \"string\""));
        assert!(md.contains("| POST | `/ai/chat` | `https://api.example.com/ai/chat` |"));
        assert!(md.contains("| `token` | POST | `https://api.example.com/ai/chat` |"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let requests = vec![TransactionRecord::request("GET", "h", "/plain")];
        let report = analyze(&requests, &[], &AnalysisConfig::default()).unwrap();

        let md = render_markdown(&report).unwrap();
        assert!(md.contains("## API Endpoints"));
        assert!(!md.contains("## Authentication Headers"));
        assert!(!md.contains("## AI Requests"));
        assert!(!md.contains("## Token Locations"));
        assert!(!md.contains("### Response Status Codes"));
        assert!(!md.contains("### Common Fields"));
        assert!(!md.contains("### JSON Body Examples"));
    }

    #[test]
    fn test_row_caps() {
        let mut requests: Vec<_> = (0..60)
            .map(|i| {
                TransactionRecord::request("POST", "h", &format!("/chat/{}", i))
                    .with_header("Cookie", &format!("sid={}", i))
                    .with_header("X-Token", "t")
                    .with_body(BodyPayload::Json {
                        data: json!({ (format!("field_{}", i)): i, "session": i }),
                    })
            })
            .collect();
        requests.push(TransactionRecord::request("GET", "h", "/last"));
        let report = analyze(&requests, &[], &AnalysisConfig::default()).unwrap();

        let md = render_markdown(&report).unwrap();
        let endpoint_rows = md
            .lines()
            .filter(|l| l.starts_with("| POST | `/chat/") && l.contains("| h | 1 |"))
            .count();
        assert_eq!(endpoint_rows, 50);
        let ai_rows = md
            .lines()
            .filter(|l| l.starts_with("| POST | `/chat/") && l.contains("https://h/chat/"))
            .count();
        assert_eq!(ai_rows, 20);
        assert!(md.contains("*11 more endpoints not shown*"));
        assert!(md.contains("#### Example 3"));
        assert!(!md.contains("#### Example 4"));
        assert!(md.contains("3. URL: `https://h/chat/2`"));
        assert!(!md.contains("4. URL:"));
        let header_token_rows = md.lines().filter(|l| l.starts_with("| X-Token |")).count();
        assert_eq!(header_token_rows, 10);
        let field_rows = md.lines().filter(|l| l.starts_with("| `field_")).count();
        assert_eq!(field_rows, 19);
    }

    #[test]
    fn test_backticks_in_values_keep_code_spans_intact() {
        let requests = vec![TransactionRecord::request("GET", "h", "/chat/`x`")
            .with_header("Authorization", "Bearer `tok`")];
        let report = analyze(&requests, &[], &AnalysisConfig::default()).unwrap();

        let md = render_markdown(&report).unwrap();
        assert!(md.contains("| GET | `` /chat/`x` `` | h | 1 |  |"));
        assert!(md.contains("1. URL: `` https://h/chat/`x` ``"));
        assert!(md.contains("   Value preview: `` Bearer `tok` ``"));
    }
}
