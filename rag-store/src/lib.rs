//! Namespaced vector index over Qdrant.
//!
//! This crate provides a small API to:
//! - Upsert id-keyed vectors with flat metadata into a named partition
//! - Query the top-K most similar vectors within a partition
//!
//! One Qdrant collection backs every namespace; the namespace is a keyword
//! payload field and point ids are derived from `(namespace, id)`.

mod config;
mod errors;
mod filters;
mod ids;
mod payload;
mod qdrant_facade;
mod record;

pub use config::{DistanceKind, MAX_UPSERT_BATCH, RagConfig, VectorSpace};
pub use errors::RagError;
pub use ids::stable_uuid;
pub use record::{IndexMatch, IndexVector, Metadata};

use qdrant_client::qdrant::{PointId, PointStruct};
use tracing::{debug, trace, warn};

/// High-level facade that wires configuration and Qdrant client.
///
/// This is the single entry point recommended for application code.
pub struct RagStore {
    cfg: RagConfig,
    client: qdrant_facade::QdrantFacade,
}

impl RagStore {
    /// Constructs a new store from the given configuration.
    ///
    /// # Errors
    /// Returns `RagError::Config` if the client initialization fails.
    pub fn new(cfg: RagConfig) -> Result<Self, RagError> {
        trace!("RagStore::new collection={}", cfg.collection);
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self { cfg, client })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Creates the backing collection if it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<(), RagError> {
        self.client
            .ensure_collection(&self.cfg.vector_space(), filters::NAMESPACE_KEY)
            .await
    }

    /// Inserts or overwrites vectors in `namespace` with a single Qdrant
    /// request, so a call is applied whole or not at all. Returns the number
    /// of vectors written.
    ///
    /// # Errors
    /// - [`RagError::EmptyNamespace`] for a blank namespace
    /// - [`RagError::BatchTooLarge`] above `upsert_batch` vectors
    /// - [`RagError::VectorSizeMismatch`] if any vector has the wrong dimension
    /// - [`RagError::Qdrant`] on client failures
    ///
    /// Nothing is written when validation fails.
    pub async fn upsert(&self, namespace: &str, vectors: Vec<IndexVector>) -> Result<u64, RagError> {
        check_namespace(namespace)?;
        if vectors.is_empty() {
            debug!(namespace, "RagStore::upsert: nothing to write");
            return Ok(0);
        }
        check_batch_size(vectors.len(), self.cfg.upsert_batch)?;

        let points = build_points(namespace, vectors, self.cfg.vector_size)?;
        let total = self.client.upsert_points(points).await?;

        debug!(namespace, total, "RagStore::upsert done");
        Ok(total)
    }

    /// Returns up to `top_k` matches from `namespace`, best first.
    ///
    /// `metadata` on each match is `Some` only when `include_metadata` is set.
    ///
    /// # Errors
    /// - [`RagError::EmptyNamespace`] for a blank namespace
    /// - [`RagError::VectorSizeMismatch`] for a query of the wrong dimension
    /// - [`RagError::Qdrant`] on client failures
    pub async fn query(
        &self,
        namespace: &str,
        vector: Vec<f32>,
        top_k: u64,
        include_metadata: bool,
    ) -> Result<Vec<IndexMatch>, RagError> {
        check_namespace(namespace)?;
        if vector.len() != self.cfg.vector_size {
            return Err(RagError::VectorSizeMismatch {
                id: "<query>".into(),
                got: vector.len(),
                want: self.cfg.vector_size,
            });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        // The caller id lives in the payload, so the payload is always fetched.
        let hits = self
            .client
            .search(
                vector,
                top_k,
                Some(filters::namespace_filter(namespace)),
                true,
                self.cfg.exact_search,
            )
            .await?;

        let mut out = Vec::with_capacity(hits.len());
        for hit in hits {
            let (id, metadata) = payload::split_payload(hit.payload);
            let Some(id) = id else {
                warn!(namespace, "point without record_id skipped");
                continue;
            };
            out.push(IndexMatch {
                id,
                score: hit.score,
                metadata: include_metadata.then_some(metadata),
            });
        }

        trace!(namespace, hits = out.len(), "RagStore::query");
        Ok(out)
    }
}

fn check_namespace(namespace: &str) -> Result<(), RagError> {
    if namespace.trim().is_empty() {
        Err(RagError::EmptyNamespace)
    } else {
        Ok(())
    }
}

fn check_batch_size(got: usize, max: usize) -> Result<(), RagError> {
    if got > max {
        Err(RagError::BatchTooLarge { got, max })
    } else {
        Ok(())
    }
}

/// Validates dimensions and converts vectors into Qdrant points.
fn build_points(
    namespace: &str,
    vectors: Vec<IndexVector>,
    want: usize,
) -> Result<Vec<PointStruct>, RagError> {
    if let Some(bad) = vectors.iter().find(|v| v.values.len() != want) {
        return Err(RagError::VectorSizeMismatch {
            id: bad.id.clone(),
            got: bad.values.len(),
            want,
        });
    }

    Ok(vectors
        .into_iter()
        .map(|v| {
            let pid: PointId = stable_uuid(namespace, &v.id).to_string().into();
            PointStruct {
                id: Some(pid),
                payload: payload::build_payload(namespace, &v.id, &v.metadata),
                vectors: Some(v.values.into()),
                ..Default::default()
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vector(id: &str, dim: usize) -> IndexVector {
        let mut metadata = Metadata::new();
        metadata.insert("name".into(), json!(format!("name-{id}")));
        IndexVector {
            id: id.into(),
            values: vec![0.5; dim],
            metadata,
        }
    }

    #[test]
    fn points_get_stable_ids_and_namespace_payload() {
        let pts = build_points("ns", vec![vector("a", 3), vector("b", 3)], 3).unwrap();
        assert_eq!(pts.len(), 2);

        let expected: PointId = stable_uuid("ns", "a").to_string().into();
        assert_eq!(pts[0].id, Some(expected));
        assert!(pts[0].payload.contains_key("namespace"));
        assert!(pts[0].payload.contains_key("record_id"));
    }

    #[test]
    fn wrong_dimension_rejects_the_whole_batch() {
        let err = build_points("ns", vec![vector("a", 3), vector("b", 2)], 3).unwrap_err();
        assert!(matches!(
            err,
            RagError::VectorSizeMismatch { ref id, got: 2, want: 3 } if id == "b"
        ));
    }

    #[test]
    fn blank_namespace_is_rejected() {
        assert!(matches!(check_namespace("  "), Err(RagError::EmptyNamespace)));
        assert!(check_namespace("product-namespace").is_ok());
    }

    #[test]
    fn batch_limit_is_inclusive() {
        assert!(check_batch_size(256, 256).is_ok());
        assert!(matches!(
            check_batch_size(257, 256),
            Err(RagError::BatchTooLarge { got: 257, max: 256 })
        ));
    }

    // The client connects lazily; every case below returns before any request.
    fn offline_store(dim: usize) -> RagStore {
        let mut cfg = RagConfig::new_default("http://127.0.0.1:6334", "products");
        cfg.vector_size = dim;
        cfg.upsert_batch = 4;
        RagStore::new(cfg).unwrap()
    }

    #[tokio::test]
    async fn oversized_upsert_is_rejected_before_writing() {
        let store = offline_store(3);
        let batch = (0..5).map(|i| vector(&format!("v{i}"), 3)).collect();

        let err = store.upsert("ns", batch).await.unwrap_err();
        assert!(matches!(err, RagError::BatchTooLarge { got: 5, max: 4 }));
    }

    #[tokio::test]
    async fn empty_upsert_writes_nothing() {
        let store = offline_store(3);
        assert_eq!(store.upsert("ns", Vec::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn query_short_circuits() {
        let store = offline_store(3);

        assert!(matches!(
            store.query(" ", vec![0.1; 3], 3, true).await,
            Err(RagError::EmptyNamespace)
        ));
        assert!(matches!(
            store.query("ns", vec![0.1; 2], 3, true).await,
            Err(RagError::VectorSizeMismatch { got: 2, want: 3, .. })
        ));
        assert!(store.query("ns", vec![0.1; 3], 0, true).await.unwrap().is_empty());
    }
}
