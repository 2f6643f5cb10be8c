//! Traffic totals and distributions.

use super::Tally;
use crate::types::TransactionRecord;
use serde::Serialize;

/// Overall counts for a capture log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_requests: usize,
    pub total_responses: usize,
    /// Request method -> count
    pub methods: Tally<String>,
    /// Request host -> count
    pub hosts: Tally<String>,
    /// Response status code -> count
    pub status_codes: Tally<u16>,
}

pub fn summarize(requests: &[TransactionRecord], responses: &[TransactionRecord]) -> Summary {
    Summary {
        total_requests: requests.len(),
        total_responses: responses.len(),
        methods: requests.iter().map(|r| r.method.clone()).collect(),
        hosts: requests.iter().map(|r| r.host.clone()).collect(),
        status_codes: responses
            .iter()
            .map(|r| r.status_code.unwrap_or(0))
            .collect(),
    }
}
