//! Deterministic point ids.

use uuid::Uuid;

/// Deterministic UUIDv5 for a record id inside a namespace.
///
/// Qdrant only accepts integers or UUIDs as point ids, so arbitrary catalog
/// ids are hashed. The same `(namespace, id)` pair always maps to the same
/// point, which turns repeated upserts into overwrites.
pub fn stable_uuid(namespace: &str, id: &str) -> Uuid {
    let key = format!("{namespace}/{id}");
    Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes())
}
