//! Structural schema inference over JSON payloads.
//!
//! Only the shape is inferred, never the meaning of a field. Arrays are
//! sampled by their first element, and nesting deeper than the configured
//! cap collapses into a leaf so hostile payloads cannot exhaust the stack.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Type name recorded for a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafType {
    String,
    Int,
    Float,
    Bool,
    Null,
    /// An object cut off by the depth cap
    Object,
    /// An empty array, or an array cut off by the depth cap
    Array,
}

impl LeafType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeafType::String => "string",
            LeafType::Int => "int",
            LeafType::Float => "float",
            LeafType::Bool => "bool",
            LeafType::Null => "null",
            LeafType::Object => "object",
            LeafType::Array => "array",
        }
    }

    fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => LeafType::String,
            Value::Number(n) if n.is_f64() => LeafType::Float,
            Value::Number(_) => LeafType::Int,
            Value::Bool(_) => LeafType::Bool,
            Value::Null => LeafType::Null,
            Value::Object(_) => LeafType::Object,
            Value::Array(_) => LeafType::Array,
        }
    }
}

/// Inferred structure of a JSON value.
///
/// Serializes to the compact form used in reports: a leaf is its type name,
/// an object is a map of field schemas and an array is a one-element list.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Leaf(LeafType),
    /// Fields in the order they appear in the payload
    Object(Vec<(String, Schema)>),
    /// Schema of the first element
    Array(Box<Schema>),
}

impl Schema {
    /// Top-level field names, if this is an object schema.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        let fields: &[(String, Schema)] = match self {
            Schema::Object(fields) => fields,
            Schema::Leaf(_) | Schema::Array(_) => &[],
        };
        fields.iter().map(|(name, _)| name.as_str())
    }

    /// Schema of a named field of an object schema.
    pub fn field(&self, name: &str) -> Option<&Schema> {
        match self {
            Schema::Object(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, s)| s),
            Schema::Leaf(_) | Schema::Array(_) => None,
        }
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Schema::Leaf(leaf) => serializer.serialize_str(leaf.as_str()),
            Schema::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, schema) in fields {
                    map.serialize_entry(name, schema)?;
                }
                map.end()
            }
            Schema::Array(item) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(item.as_ref())?;
                seq.end()
            }
        }
    }
}

/// Infer the schema of `value`, descending at most `max_depth` containers.
pub fn infer_schema(value: &Value, max_depth: usize) -> Schema {
    match value {
        Value::Object(_) | Value::Array(_) if max_depth == 0 => Schema::Leaf(LeafType::of(value)),
        Value::Object(map) => Schema::Object(
            map.iter()
                .map(|(key, v)| (key.clone(), infer_schema(v, max_depth - 1)))
                .collect(),
        ),
        Value::Array(items) => match items.first() {
            None => Schema::Leaf(LeafType::Array),
            Some(first @ (Value::Object(_) | Value::Array(_))) => {
                Schema::Array(Box::new(infer_schema(first, max_depth - 1)))
            }
            Some(scalar) => Schema::Leaf(LeafType::of(scalar)),
        },
        scalar => Schema::Leaf(LeafType::of(scalar)),
    }
}
