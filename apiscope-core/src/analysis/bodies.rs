//! Request body shapes.
//!
//! JSON object bodies get a full recursive schema. The common-field table,
//! however, counts only top-level field names: a field nested inside a
//! sub-object does not contribute. Whether the capture tooling meant this as
//! a scope limit or overlooked it is unknown, so the behavior is kept as is.

use super::schema::{infer_schema, Schema};
use super::tally::serialize_pairs;
use super::Tally;
use crate::body::BodyPayload;
use crate::types::TransactionRecord;
use serde::Serialize;

/// Rows kept in the common-field table.
pub const MAX_COMMON_FIELDS: usize = 20;
/// JSON examples kept in the report.
pub const MAX_JSON_EXAMPLES: usize = 5;

/// A JSON request body and its inferred schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonBodyExample {
    pub url: String,
    pub method: String,
    pub schema: Schema,
}

/// Result of the request body pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBodyReport {
    /// JSON object bodies plus text bodies
    pub total_with_body: usize,
    pub empty_bodies: usize,
    pub json_bodies_count: usize,
    pub text_bodies_count: usize,
    /// Top-level field name -> number of JSON bodies containing it
    #[serde(serialize_with = "serialize_pairs")]
    pub common_fields: Vec<(String, usize)>,
    pub json_examples: Vec<JsonBodyExample>,
}

/// Classify request bodies and infer schemas for JSON objects.
///
/// JSON bodies that are not objects, and binary bodies, are counted nowhere.
pub fn analyze_request_bodies(
    requests: &[TransactionRecord],
    max_schema_depth: usize,
) -> RequestBodyReport {
    let mut empty_bodies = 0;
    let mut json_bodies_count = 0;
    let mut text_bodies_count = 0;
    let mut field_tally: Tally<String> = Tally::new();
    let mut json_examples = Vec::new();

    for req in requests {
        match &req.body {
            BodyPayload::Empty => empty_bodies += 1,
            BodyPayload::Json { data } if data.is_object() => {
                json_bodies_count += 1;
                let schema = infer_schema(data, max_schema_depth);
                for name in schema.field_names() {
                    field_tally.add(name.to_string());
                }
                if json_examples.len() < MAX_JSON_EXAMPLES {
                    json_examples.push(JsonBodyExample {
                        url: req.url.clone(),
                        method: req.method.clone(),
                        schema,
                    });
                }
            }
            BodyPayload::Json { .. } => {
                tracing::debug!(url = %req.url, "JSON body is not an object, skipping schema");
            }
            BodyPayload::Text { .. } => text_bodies_count += 1,
            BodyPayload::Binary { .. } => {}
        }
    }

    let common_fields = field_tally
        .most_frequent()
        .into_iter()
        .take(MAX_COMMON_FIELDS)
        .map(|(name, count)| (name.clone(), count))
        .collect();

    RequestBodyReport {
        total_with_body: json_bodies_count + text_bodies_count,
        empty_bodies,
        json_bodies_count,
        text_bodies_count,
        common_fields,
        json_examples,
    }
}
