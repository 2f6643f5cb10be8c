//! Authentication header classification.
//!
//! Every request header is placed into at most one [`AuthBucket`] by a
//! case-insensitive substring match on its name. Buckets are checked in
//! declaration order and the first match wins, so `X-Auth-Token` is an
//! auth-token header even though other rules could also claim it.

use super::tally::serialize_pairs;
use super::Tally;
use crate::types::TransactionRecord;
use serde::Serialize;

/// Examples kept per bucket.
pub const MAX_EXAMPLES_PER_BUCKET: usize = 10;

/// Mutually exclusive auth header categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AuthBucket {
    #[serde(rename = "Authorization")]
    Authorization,
    #[serde(rename = "X-API-Key")]
    ApiKey,
    #[serde(rename = "X-Auth-Token")]
    AuthToken,
    #[serde(rename = "Cookie")]
    Cookie,
}

impl AuthBucket {
    /// Classify a header name, or `None` if it is not auth-related.
    pub fn classify(header_name: &str) -> Option<Self> {
        let name = header_name.to_lowercase();
        if name.contains("authorization") {
            Some(AuthBucket::Authorization)
        } else if name.contains("api-key") || name.contains("apikey") {
            Some(AuthBucket::ApiKey)
        } else if name.contains("auth-token") || name.contains("token") {
            Some(AuthBucket::AuthToken)
        } else if name.contains("cookie") {
            Some(AuthBucket::Cookie)
        } else {
            None
        }
    }

    /// Number of characters of the value kept as a preview.
    pub fn preview_len(&self) -> usize {
        match self {
            AuthBucket::Cookie => 100,
            AuthBucket::Authorization | AuthBucket::ApiKey | AuthBucket::AuthToken => 50,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthBucket::Authorization => "Authorization",
            AuthBucket::ApiKey => "X-API-Key",
            AuthBucket::AuthToken => "X-Auth-Token",
            AuthBucket::Cookie => "Cookie",
        }
    }
}

/// Scheme of an `Authorization` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AuthFormat {
    #[serde(rename = "Bearer Token")]
    Bearer,
    #[serde(rename = "Basic Auth")]
    Basic,
    #[serde(rename = "Token")]
    Token,
    #[serde(rename = "Other")]
    Other,
}

impl AuthFormat {
    pub fn classify(value: &str) -> Self {
        if value.starts_with("Bearer ") {
            AuthFormat::Bearer
        } else if value.starts_with("Basic ") {
            AuthFormat::Basic
        } else if value.starts_with("Token ") {
            AuthFormat::Token
        } else {
            AuthFormat::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthFormat::Bearer => "Bearer Token",
            AuthFormat::Basic => "Basic Auth",
            AuthFormat::Token => "Token",
            AuthFormat::Other => "Other",
        }
    }
}

/// One auth header occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthHit {
    pub url: String,
    pub value_preview: String,
}

/// Result of the auth header pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthHeaderReport {
    /// Hits per bucket, buckets in first-seen order
    pub headers_found: Tally<AuthBucket>,
    /// Schemes of `Authorization` values
    pub auth_formats: Tally<AuthFormat>,
    /// First hits per bucket
    #[serde(serialize_with = "serialize_pairs")]
    pub details: Vec<(AuthBucket, Vec<AuthHit>)>,
}

impl AuthHeaderReport {
    pub fn is_empty(&self) -> bool {
        self.headers_found.is_empty()
    }

    pub fn examples(&self, bucket: AuthBucket) -> &[AuthHit] {
        self.details
            .iter()
            .find(|(b, _)| *b == bucket)
            .map(|(_, hits)| hits.as_slice())
            .unwrap_or(&[])
    }
}

fn preview(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

pub fn analyze_auth_headers(requests: &[TransactionRecord]) -> AuthHeaderReport {
    let mut headers_found = Tally::new();
    let mut auth_formats = Tally::new();
    let mut details: Vec<(AuthBucket, Vec<AuthHit>)> = Vec::new();

    for req in requests {
        for (name, value) in req.headers.iter() {
            let Some(bucket) = AuthBucket::classify(name) else {
                continue;
            };

            let value_preview = preview(value, bucket.preview_len());
            if bucket == AuthBucket::Authorization {
                auth_formats.add(AuthFormat::classify(&value_preview));
            }
            headers_found.add(bucket);

            let slot = match details.iter().position(|(b, _)| *b == bucket) {
                Some(i) => i,
                None => {
                    details.push((bucket, Vec::new()));
                    details.len() - 1
                }
            };
            let hits = &mut details[slot].1;
            if hits.len() < MAX_EXAMPLES_PER_BUCKET {
                hits.push(AuthHit {
                    url: req.url.clone(),
                    value_preview,
                });
            }
        }
    }

    AuthHeaderReport {
        headers_found,
        auth_formats,
        details,
    }
}
