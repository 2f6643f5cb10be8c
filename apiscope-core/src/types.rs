//! Core domain types for apiscope
//!
//! These types mirror one line of the capture log. Each line is a single
//! request or response event written by the interception pipeline.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Transaction record** | One logged request or response event |
//! | **Endpoint** | A `(method, path)` pair used to group requests |
//! | **Bucket** | One of the four mutually exclusive auth-header categories |
//! | **Token location** | A header or JSON field whose name suggests a credential |

use crate::body::{deserialize_body, BodyPayload};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

// ============================================
// Record kind
// ============================================

/// Direction of a logged event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Request,
    Response,
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request" => Ok(RecordKind::Request),
            "response" => Ok(RecordKind::Response),
            _ => Err(format!("unknown record kind: {}", s)),
        }
    }
}

// ============================================
// Headers
// ============================================

/// Header name/value pairs in capture order.
///
/// Names keep their original casing; matching against them is done
/// case-insensitively by the analysis passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of header names to values")
            }

            // Null values are dropped; other non-string values keep their JSON text.
            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Headers, A::Error> {
                let mut headers = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    match value {
                        Value::Null => {}
                        Value::String(s) => headers.push((name, s)),
                        other => headers.push((name, other.to_string())),
                    }
                }
                Ok(Headers(headers))
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

// ============================================
// Transaction record
// ============================================

/// One request or response event from the capture log.
///
/// Missing fields fall back to the same defaults the capture tooling uses
/// when it reads its own logs (`UNKNOWN` method, `unknown` host).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// ISO-8601 capture time, kept verbatim
    #[serde(default)]
    pub timestamp: String,
    #[serde(default = "unknown_method")]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "unknown_host")]
    pub host: String,
    /// Request path; the capture pipeline records it without the query string
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub content_length: u64,
    #[serde(default, deserialize_with = "deserialize_body")]
    pub body: BodyPayload,
    /// Present on responses only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

fn unknown_method() -> String {
    "UNKNOWN".to_string()
}

fn unknown_host() -> String {
    "unknown".to_string()
}

impl TransactionRecord {
    /// Create a request record for `https://{host}{path}`.
    pub fn request(method: &str, host: &str, path: &str) -> Self {
        Self::new(RecordKind::Request, method, host, path)
    }

    /// Create a response record for the request identified by method and path.
    pub fn response(method: &str, host: &str, path: &str, status_code: u16) -> Self {
        let mut record = Self::new(RecordKind::Response, method, host, path);
        record.status_code = Some(status_code);
        record
    }

    fn new(kind: RecordKind, method: &str, host: &str, path: &str) -> Self {
        Self {
            kind,
            timestamp: String::new(),
            method: method.to_string(),
            url: format!("https://{}{}", host, path),
            host: host.to_string(),
            path: path.to_string(),
            headers: Headers::new(),
            content_length: 0,
            body: BodyPayload::Empty,
            status_code: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push(name, value);
        self
    }

    pub fn with_body(mut self, body: BodyPayload) -> Self {
        self.body = body;
        self
    }

    /// Endpoint identity: `"<METHOD> <PATH>"`.
    pub fn endpoint_key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}
