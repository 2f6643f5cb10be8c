//! Endpoint catalog: requests grouped by `"<METHOD> <PATH>"`.

use super::Tally;
use crate::types::TransactionRecord;
use serde::Serialize;
use std::collections::HashMap;

/// One distinct endpoint seen in the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointRecord {
    pub method: String,
    pub path: String,
    /// Host of the first request seen for this endpoint
    pub host: String,
    /// `host` + `path`
    pub url: String,
    /// Number of requests
    pub count: usize,
    /// Status codes of responses to this endpoint
    pub status_codes: Tally<u16>,
}

impl EndpointRecord {
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Build the endpoint catalog, most requested first.
///
/// Responses are matched to endpoints by the same key; a response whose key
/// has no request group is ignored. Ties keep discovery order.
pub fn catalog_endpoints(
    requests: &[TransactionRecord],
    responses: &[TransactionRecord],
) -> Vec<EndpointRecord> {
    let mut endpoints: Vec<EndpointRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for req in requests {
        let key = req.endpoint_key();
        match index.get(&key) {
            Some(&i) => endpoints[i].count += 1,
            None => {
                index.insert(key, endpoints.len());
                endpoints.push(EndpointRecord {
                    method: req.method.clone(),
                    path: req.path.clone(),
                    host: req.host.clone(),
                    url: format!("{}{}", req.host, req.path),
                    count: 1,
                    status_codes: Tally::new(),
                });
            }
        }
    }

    for resp in responses {
        if let Some(&i) = index.get(&resp.endpoint_key()) {
            endpoints[i].status_codes.add(resp.status_code.unwrap_or(0));
        }
    }

    endpoints.sort_by(|a, b| b.count.cmp(&a.count));
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_method_and_path() {
        let requests = vec![
            TransactionRecord::request("GET", "a.com", "/a"),
            TransactionRecord::request("POST", "a.com", "/a"),
            TransactionRecord::request("GET", "b.com", "/a"),
        ];

        let endpoints = catalog_endpoints(&requests, &[]);
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].key(), "GET /a");
        assert_eq!(endpoints[0].count, 2);
        // host comes from the first request seen
        assert_eq!(endpoints[0].host, "a.com");
        assert_eq!(endpoints[0].url, "a.com/a");
        assert_eq!(endpoints[1].key(), "POST /a");
    }

    #[test]
    fn test_sort_is_stable_on_discovery_order() {
        let requests = vec![
            TransactionRecord::request("GET", "h", "/first"),
            TransactionRecord::request("GET", "h", "/second"),
            TransactionRecord::request("GET", "h", "/popular"),
            TransactionRecord::request("GET", "h", "/popular"),
            TransactionRecord::request("GET", "h", "/third"),
        ];

        let paths: Vec<_> = catalog_endpoints(&requests, &[])
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(paths, vec!["/popular", "/first", "/second", "/third"]);
    }

    #[test]
    fn test_attaches_status_codes_for_matching_responses() {
        let requests = vec![
            TransactionRecord::request("GET", "h", "/a"),
            TransactionRecord::request("GET", "h", "/b"),
        ];
        let responses = vec![
            TransactionRecord::response("GET", "h", "/a", 200),
            TransactionRecord::response("GET", "h", "/a", 404),
            TransactionRecord::response("GET", "h", "/a", 200),
            TransactionRecord::response("DELETE", "h", "/orphan", 204),
        ];

        let endpoints = catalog_endpoints(&requests, &responses);
        let a = endpoints.iter().find(|e| e.path == "/a").unwrap();
        assert_eq!(a.status_codes.get(&200), 2);
        assert_eq!(a.status_codes.get(&404), 1);

        let b = endpoints.iter().find(|e| e.path == "/b").unwrap();
        assert!(b.status_codes.is_empty());
        assert!(endpoints.iter().all(|e| e.path != "/orphan"));
    }

    #[test]
    fn test_counts_sum_to_request_totals() {
        let requests: Vec<_> = ["/a", "/b", "/a", "/c", "/a", "/b"]
            .iter()
            .map(|p| TransactionRecord::request("GET", "h", p))
            .collect();

        let endpoints = catalog_endpoints(&requests, &[]);
        let total: usize = endpoints.iter().map(|e| e.count).sum();
        assert_eq!(total, requests.len());
    }
}
