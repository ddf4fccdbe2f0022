//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat key/value metadata attached to an indexed vector.
pub type Metadata = BTreeMap<String, Value>;

/// A vector to be written into a namespace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexVector {
    /// Caller-side record id (unique within a namespace).
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A single query hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    /// Caller-side record id as given at upsert time.
    pub id: String,
    /// Cosine similarity, higher is more similar.
    pub score: f32,
    /// Present only when metadata was requested.
    pub metadata: Option<Metadata>,
}
