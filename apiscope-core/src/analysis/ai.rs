//! AI service traffic detection by path.

use crate::types::TransactionRecord;
use serde::Serialize;

/// Path fragments that mark a request as AI-related.
pub const AI_PATH_MARKERS: [&str; 4] = ["/ai/", "/multi-agent", "/chat", "/completion"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiRequest {
    pub url: String,
    pub method: String,
    pub path: String,
    pub has_body: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiRequestReport {
    pub count: usize,
    pub requests: Vec<AiRequest>,
}

pub fn is_ai_path(path: &str) -> bool {
    AI_PATH_MARKERS.iter().any(|marker| path.contains(marker))
}

pub fn find_ai_requests(requests: &[TransactionRecord]) -> AiRequestReport {
    let matches: Vec<AiRequest> = requests
        .iter()
        .filter(|req| is_ai_path(&req.path))
        .map(|req| AiRequest {
            url: req.url.clone(),
            method: req.method.clone(),
            path: req.path.clone(),
            has_body: !req.body.is_empty(),
        })
        .collect();

    AiRequestReport {
        count: matches.len(),
        requests: matches,
    }
}
