//! Conversion between JSON metadata and Qdrant payloads.
//!
//! A stored payload has three reserved keys:
//! - `namespace` → keyword used for filtering
//! - `record_id` → the caller's id (point ids are UUIDs)
//! - `metadata`  → the caller's metadata as a nested struct

use std::collections::HashMap;

use qdrant_client::qdrant::{ListValue, Struct, Value as QValue, value::Kind};
use serde_json::{Map, Value};

use crate::filters::NAMESPACE_KEY;
use crate::record::Metadata;

pub const RECORD_ID_KEY: &str = "record_id";
pub const METADATA_KEY: &str = "metadata";

/// Builds the stored payload for one vector.
pub fn build_payload(namespace: &str, id: &str, metadata: &Metadata) -> HashMap<String, QValue> {
    let mut payload = HashMap::with_capacity(3);
    payload.insert(NAMESPACE_KEY.to_string(), qstring(namespace));
    payload.insert(RECORD_ID_KEY.to_string(), qstring(id));
    let fields = metadata
        .iter()
        .map(|(k, v)| (k.clone(), json_to_qvalue(v.clone())))
        .collect();
    payload.insert(
        METADATA_KEY.to_string(),
        QValue {
            kind: Some(Kind::StructValue(Struct { fields })),
        },
    );
    payload
}

/// Splits a stored payload back into `(record_id, metadata)`.
///
/// Missing pieces yield `None` / empty metadata.
pub fn split_payload(mut payload: HashMap<String, QValue>) -> (Option<String>, Metadata) {
    let id = payload.remove(RECORD_ID_KEY).and_then(|v| match v.kind {
        Some(Kind::StringValue(s)) => Some(s),
        _ => None,
    });
    let metadata = match payload.remove(METADATA_KEY).map(qvalue_to_json) {
        Some(Value::Object(map)) => map.into_iter().collect(),
        _ => Metadata::new(),
    };
    (id, metadata)
}

fn qstring(s: &str) -> QValue {
    QValue {
        kind: Some(Kind::StringValue(s.to_string())),
    }
}

/// Converts `serde_json::Value` into Qdrant `Value` (handles arrays/objects).
pub fn json_to_qvalue(v: Value) -> QValue {
    let kind = match v {
        Value::String(s) => Some(Kind::StringValue(s)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(Kind::IntegerValue(i)),
            (None, Some(f)) => Some(Kind::DoubleValue(f)),
            (None, None) => Some(Kind::StringValue(n.to_string())),
        },
        Value::Bool(b) => Some(Kind::BoolValue(b)),
        Value::Array(arr) => Some(Kind::ListValue(ListValue {
            values: arr.into_iter().map(json_to_qvalue).collect(),
        })),
        Value::Object(map) => Some(Kind::StructValue(Struct {
            fields: map.into_iter().map(|(k, v)| (k, json_to_qvalue(v))).collect(),
        })),
        Value::Null => None,
    };
    QValue { kind }
}

/// Converts a Qdrant `Value` back into JSON.
pub fn qvalue_to_json(v: QValue) -> Value {
    match v.kind {
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(f)) => serde_json::json!(f),
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::ListValue(l)) => Value::Array(l.values.into_iter().map(qvalue_to_json).collect()),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, qvalue_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
        Some(Kind::NullValue(_)) | None => Value::Null,
    }
}
