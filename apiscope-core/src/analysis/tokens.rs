//! Credential placement heuristics.
//!
//! The header keyword set is narrower than the auth bucket rules: cookies
//! and `apikey` spellings are not token locations here.

use crate::types::TransactionRecord;
use serde::Serialize;

const HEADER_KEYWORDS: [&str; 3] = ["authorization", "token", "api-key"];
const BODY_FIELD_KEYWORDS: [&str; 4] = ["token", "auth", "session", "api_key"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderTokenHit {
    pub header: String,
    pub url: String,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyTokenHit {
    pub field: String,
    pub url: String,
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TokenDetails {
    pub headers: Vec<HeaderTokenHit>,
    pub body: Vec<BodyTokenHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenLocationReport {
    pub header_tokens: usize,
    pub body_tokens: usize,
    pub details: TokenDetails,
}

fn name_matches(name: &str, keywords: &[&str]) -> bool {
    let lower = name.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

pub fn locate_tokens(requests: &[TransactionRecord]) -> TokenLocationReport {
    let mut details = TokenDetails::default();

    for req in requests {
        for (name, _) in req.headers.iter() {
            if name_matches(name, &HEADER_KEYWORDS) {
                details.headers.push(HeaderTokenHit {
                    header: name.to_string(),
                    url: req.url.clone(),
                    method: req.method.clone(),
                });
            }
        }

        if let Some(fields) = req.body.as_json_object() {
            for key in fields.keys() {
                if name_matches(key, &BODY_FIELD_KEYWORDS) {
                    details.body.push(BodyTokenHit {
                        field: key.clone(),
                        url: req.url.clone(),
                        method: req.method.clone(),
                    });
                }
            }
        }
    }

    TokenLocationReport {
        header_tokens: details.headers.len(),
        body_tokens: details.body.len(),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyPayload;
    use serde_json::json;

    #[test]
    fn test_header_keywords() {
        let requests = vec![TransactionRecord::request("GET", "h", "/")
            .with_header("Authorization", "Bearer x")
            .with_header("X-Refresh-Token", "r")
            .with_header("X-API-Key", "k")
            .with_header("X-ApiKey", "k")
            .with_header("Cookie", "c")];

        let report = locate_tokens(&requests);
        let names: Vec<_> = report
            .details
            .headers
            .iter()
            .map(|h| h.header.as_str())
            .collect();
        assert_eq!(names, vec!["Authorization", "X-Refresh-Token", "X-API-Key"]);
        assert_eq!(report.header_tokens, 3);
    }

    #[test]
    fn test_body_fields_top_level_only() {
        let requests = vec![TransactionRecord::request("POST", "h", "/login").with_body(
            BodyPayload::Json {
                data: json!({
                    "AccessToken": "a",
                    "sessionId": "s",
                    "api_key": "k",
                    "authCode": "c",
                    "user": {"token": "nested"}
                }),
            },
        )];

        let report = locate_tokens(&requests);
        let fields: Vec<_> = report
            .details
            .body
            .iter()
            .map(|b| b.field.as_str())
            .collect();
        assert_eq!(fields, vec!["AccessToken", "sessionId", "api_key", "authCode"]);
        assert_eq!(report.body_tokens, 4);
        assert_eq!(report.details.body[0].method, "POST");
    }

    #[test]
    fn test_non_object_json_body_is_skipped() {
        let requests = vec![TransactionRecord::request("POST", "h", "/")
            .with_body(BodyPayload::Json {
                data: json!(["token"]),
            })];
        assert_eq!(locate_tokens(&requests).body_tokens, 0);
    }
}
