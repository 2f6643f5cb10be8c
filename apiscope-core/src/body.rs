//! Captured body payloads.
//!
//! Bodies are stored in the capture log as a tagged object:
//!
//! ```json
//! {"type": "empty", "data": null}
//! {"type": "json", "data": {"model": "gpt-4"}}
//! {"type": "text", "data": "hello"}
//! {"type": "binary", "data": "AAEC", "truncated": true, "original_size": 2000000}
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};

/// Default threshold above which bodies are truncated (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1_048_576;

/// A request or response body as recorded by the capture pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodyPayload {
    /// No body bytes
    #[default]
    Empty,
    /// UTF-8 body that parsed as JSON
    Json { data: serde_json::Value },
    /// UTF-8 body that is not JSON
    Text { data: String },
    /// Base64 of the (possibly truncated) raw bytes
    Binary {
        data: String,
        #[serde(default)]
        truncated: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        original_size: Option<u64>,
    },
}

impl BodyPayload {
    /// Classify raw body bytes.
    ///
    /// The size check runs before content sniffing, so an oversized body is
    /// always `Binary` with `truncated = true`, even when it is valid JSON.
    pub fn encode(content: &[u8], max_body_size: usize) -> Self {
        if content.is_empty() {
            return BodyPayload::Empty;
        }

        if content.len() > max_body_size {
            return BodyPayload::Binary {
                data: STANDARD.encode(&content[..max_body_size]),
                truncated: true,
                original_size: Some(content.len() as u64),
            };
        }

        match std::str::from_utf8(content) {
            Ok(text) => match serde_json::from_str(text) {
                Ok(data) => BodyPayload::Json { data },
                Err(_) => BodyPayload::Text {
                    data: text.to_string(),
                },
            },
            Err(_) => BodyPayload::Binary {
                data: STANDARD.encode(content),
                truncated: false,
                original_size: Some(content.len() as u64),
            },
        }
    }

    /// Returns true for [`BodyPayload::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, BodyPayload::Empty)
    }

    /// Returns the top-level JSON object, if this is a JSON object body.
    pub fn as_json_object(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self {
            BodyPayload::Json { data } => data.as_object(),
            BodyPayload::Empty | BodyPayload::Text { .. } | BodyPayload::Binary { .. } => None,
        }
    }

    /// Re-apply the size limit to a body read back from a log.
    ///
    /// Text and JSON bodies larger than `max_body_size` once encoded become
    /// the truncated `Binary` that [`BodyPayload::encode`] would have written.
    /// Other bodies are returned unchanged.
    pub fn enforce_limit(self, max_body_size: usize) -> Self {
        let oversized = match &self {
            BodyPayload::Text { data } if data.len() > max_body_size => {
                Some(data.as_bytes().to_vec())
            }
            BodyPayload::Json { data } => serde_json::to_vec(data)
                .ok()
                .filter(|bytes| bytes.len() > max_body_size),
            BodyPayload::Empty | BodyPayload::Text { .. } | BodyPayload::Binary { .. } => None,
        };

        match oversized {
            Some(bytes) => BodyPayload::encode(&bytes, max_body_size),
            None => self,
        }
    }
}

/// Deserializes a body field.
///
/// JSON `null` is [`BodyPayload::Empty`]. A payload of any other shape that
/// does not match the wire format is also read as `Empty`, with a warning, so
/// the rest of the record survives.
pub(crate) fn deserialize_body<'de, D>(deserializer: D) -> Result<BodyPayload, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(BodyPayload::Empty);
    }

    match BodyPayload::deserialize(&raw) {
        Ok(body) => Ok(body),
        Err(e) => {
            tracing::warn!(error = %e, "unrecognized body payload, treating as empty");
            Ok(BodyPayload::Empty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_empty() {
        assert_eq!(
            BodyPayload::encode(b"", DEFAULT_MAX_BODY_SIZE),
            BodyPayload::Empty
        );
    }

    #[test]
    fn test_encode_json() {
        let body = BodyPayload::encode(br#"{"model":"gpt-4"}"#, DEFAULT_MAX_BODY_SIZE);
        assert_eq!(
            body,
            BodyPayload::Json {
                data: json!({"model": "gpt-4"})
            }
        );
    }

    #[test]
    fn test_encode_text() {
        let body = BodyPayload::encode(b"a=1&b=2", DEFAULT_MAX_BODY_SIZE);
        assert_eq!(
            body,
            BodyPayload::Text {
                data: "a=1&b=2".to_string()
            }
        );
    }

    #[test]
    fn test_encode_invalid_utf8_is_binary() {
        let body = BodyPayload::encode(&[0xff, 0xfe, 0x00], DEFAULT_MAX_BODY_SIZE);
        match body {
            BodyPayload::Binary {
                data,
                truncated,
                original_size,
            } => {
                assert_eq!(data, "//4A");
                assert!(!truncated);
                assert_eq!(original_size, Some(3));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_json_is_truncated_binary() {
        // Valid JSON string literal padded out to 2,000,000 bytes
        let mut content = Vec::with_capacity(2_000_000);
        content.push(b'"');
        content.resize(1_999_999, b'a');
        content.push(b'"');
        assert_eq!(content.len(), 2_000_000);

        let body = BodyPayload::encode(&content, DEFAULT_MAX_BODY_SIZE);
        match body {
            BodyPayload::Binary {
                data,
                truncated,
                original_size,
            } => {
                assert!(truncated);
                assert_eq!(original_size, Some(2_000_000));
                let decoded = STANDARD.decode(data).unwrap();
                assert_eq!(decoded.len(), DEFAULT_MAX_BODY_SIZE);
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_body_at_limit_is_not_truncated() {
        let body = BodyPayload::encode(b"1234", 4);
        assert_eq!(body, BodyPayload::Json { data: json!(1234) });
    }

    #[test]
    fn test_wire_format() {
        let empty: BodyPayload =
            serde_json::from_value(json!({"type": "empty", "data": null})).unwrap();
        assert_eq!(empty, BodyPayload::Empty);

        let binary: BodyPayload =
            serde_json::from_value(json!({"type": "binary", "data": "AAEC"})).unwrap();
        assert_eq!(
            binary,
            BodyPayload::Binary {
                data: "AAEC".to_string(),
                truncated: false,
                original_size: None,
            }
        );

        let value = serde_json::to_value(BodyPayload::Text {
            data: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "text", "data": "hi"}));
    }

    #[test]
    fn test_as_json_object() {
        let object = BodyPayload::Json {
            data: json!({"token": "x"}),
        };
        assert!(object.as_json_object().is_some());

        let array = BodyPayload::Json { data: json!([1, 2]) };
        assert!(array.as_json_object().is_none());
        assert!(BodyPayload::Empty.as_json_object().is_none());
    }

    #[test]
    fn test_enforce_limit_truncates_large_text_and_json() {
        let text = BodyPayload::Text {
            data: "user=alice&pass=secret".to_string(),
        };
        match text.enforce_limit(8) {
            BodyPayload::Binary {
                data,
                truncated,
                original_size,
            } => {
                assert!(truncated);
                assert_eq!(original_size, Some(22));
                assert_eq!(STANDARD.decode(data).unwrap(), b"user=ali");
            }
            other => panic!("expected binary, got {:?}", other),
        }

        let json = BodyPayload::Json {
            data: json!({"model": "gpt-4"}),
        };
        assert!(matches!(
            json.enforce_limit(8),
            BodyPayload::Binary {
                truncated: true,
                original_size: Some(17),
                ..
            }
        ));
    }

    #[test]
    fn test_enforce_limit_keeps_small_bodies() {
        let json = BodyPayload::Json {
            data: json!({"a": 1}),
        };
        assert_eq!(json.clone().enforce_limit(DEFAULT_MAX_BODY_SIZE), json);

        let binary = BodyPayload::Binary {
            data: "AAEC".to_string(),
            truncated: false,
            original_size: Some(3),
        };
        assert_eq!(binary.clone().enforce_limit(1), binary);
        assert_eq!(BodyPayload::Empty.enforce_limit(1), BodyPayload::Empty);
    }
}
