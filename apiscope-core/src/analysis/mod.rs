//! Traffic analysis engine
//!
//! Six independent passes read the loaded requests and responses and each
//! produce one section of an [`AnalysisReport`]:
//!
//! | Pass | Module | Section |
//! |------|--------|---------|
//! | Summary | [`summary`] | totals, method/host/status distributions |
//! | Endpoint catalog | [`endpoints`] | `METHOD PATH` groups with status codes |
//! | Auth headers | [`auth`] | bucketed auth headers and value previews |
//! | Request bodies | [`bodies`] | body kinds, schemas, common fields |
//! | AI traffic | [`ai`] | requests to AI-looking paths |
//! | Token locations | [`tokens`] | headers and JSON fields that carry credentials |
//!
//! Passes share the input slices immutably and run on scoped threads; the
//! report is assembled once all of them have joined.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use apiscope_core::analysis::analyze;
//! use apiscope_core::config::AnalysisConfig;
//! use apiscope_core::ingest;
//!
//! let log = ingest::load(std::path::Path::new("requests.jsonl")).unwrap();
//! let report = analyze(&log.requests, &log.responses, &AnalysisConfig::default()).unwrap();
//! println!("{} endpoints", report.endpoints.len());
//! ```

pub mod ai;
pub mod auth;
pub mod bodies;
pub mod endpoints;
pub mod schema;
pub mod summary;
pub mod tally;
pub mod tokens;

pub use ai::{AiRequest, AiRequestReport};
pub use auth::{AuthBucket, AuthFormat, AuthHeaderReport, AuthHit};
pub use bodies::{JsonBodyExample, RequestBodyReport};
pub use endpoints::EndpointRecord;
pub use schema::{infer_schema, LeafType, Schema};
pub use summary::Summary;
pub use tally::Tally;
pub use tokens::{BodyTokenHit, HeaderTokenHit, TokenDetails, TokenLocationReport};

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::types::TransactionRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::thread::ScopedJoinHandle;
use std::time::Instant;

/// Aggregated result of all analysis passes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// When the analysis ran
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    /// Most requested first
    pub endpoints: Vec<EndpointRecord>,
    pub auth_headers: AuthHeaderReport,
    pub request_bodies: RequestBodyReport,
    pub ai_requests: AiRequestReport,
    pub token_locations: TokenLocationReport,
}

/// Run every analysis pass over a loaded capture log.
///
/// Fails with [`Error::EmptyDataset`] when there are no requests; a log of
/// responses alone has nothing to group them by.
pub fn analyze(
    requests: &[TransactionRecord],
    responses: &[TransactionRecord],
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    if requests.is_empty() {
        return Err(Error::EmptyDataset);
    }

    tracing::debug!(
        requests = requests.len(),
        responses = responses.len(),
        "Running analysis passes"
    );

    let report = std::thread::scope(|scope| {
        let summary = scope.spawn(|| timed("summary", || summary::summarize(requests, responses)));
        let endpoints = scope.spawn(|| {
            timed("endpoints", || {
                endpoints::catalog_endpoints(requests, responses)
            })
        });
        let auth_headers =
            scope.spawn(|| timed("auth_headers", || auth::analyze_auth_headers(requests)));
        let request_bodies = scope.spawn(|| {
            timed("request_bodies", || {
                bodies::analyze_request_bodies(requests, config.max_schema_depth)
            })
        });
        let ai_requests = scope.spawn(|| timed("ai_requests", || ai::find_ai_requests(requests)));
        let token_locations =
            scope.spawn(|| timed("token_locations", || tokens::locate_tokens(requests)));

        AnalysisReport {
            generated_at: Utc::now(),
            summary: join(summary),
            endpoints: join(endpoints),
            auth_headers: join(auth_headers),
            request_bodies: join(request_bodies),
            ai_requests: join(ai_requests),
            token_locations: join(token_locations),
        }
    });

    tracing::info!(
        endpoints = report.endpoints.len(),
        ai_requests = report.ai_requests.count,
        "Analysis complete"
    );

    Ok(report)
}

fn timed<T>(pass: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    tracing::debug!(
        pass,
        duration_ms = start.elapsed().as_millis() as u64,
        "Analysis pass finished"
    );
    out
}

/// Join a pass, re-raising its panic on the calling thread.
fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}
