//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind a minimal API,
//! hiding away the verbose builder pattern and keeping the rest of the
//! application decoupled from `qdrant-client`.

use std::collections::HashMap;

use crate::config::{DistanceKind, RagConfig, VectorSpace};
use crate::errors::RagError;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, FieldType, Filter, PointStruct,
    CreateFieldIndexCollectionBuilder, SearchParamsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
};
use tracing::{debug, info, warn};

/// One raw search hit: score plus the stored payload.
pub struct RawHit {
    pub score: f32,
    pub payload: HashMap<String, QValue>,
}

/// A facade over the Qdrant client.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Supports optional API key authentication.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
        })
    }

    /// Ensures that the collection and its namespace index exist.
    ///
    /// - Missing collection → created with the given vector space.
    /// - The keyword index on `namespace_field` is (re)applied every time;
    ///   Qdrant treats an identical index as a no-op, and a previous run may
    ///   have stopped between the two calls.
    pub async fn ensure_collection(
        &self,
        space: &VectorSpace,
        namespace_field: &str,
    ) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        if exists {
            debug!("Collection '{}' already exists", self.collection);
        } else {
            warn!(
                "Collection '{}' not found, creating with size={} distance={:?}",
                self.collection, space.size, self.distance
            );

            let distance = match self.distance {
                DistanceKind::Cosine => Distance::Cosine,
                DistanceKind::Dot => Distance::Dot,
                DistanceKind::Euclid => Distance::Euclid,
            };

            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection)
                        .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
                )
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;
            info!("Collection '{}' created successfully", self.collection);
        }

        self.client
            .create_field_index(
                CreateFieldIndexCollectionBuilder::new(
                    &self.collection,
                    namespace_field,
                    FieldType::Keyword,
                )
                .wait(true),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        debug!(field = namespace_field, "namespace index ensured");
        Ok(())
    }

    /// Upserts (inserts or updates) a batch of points and waits for the write
    /// to be applied, so a following search observes it.
    ///
    /// Returns the number of points written.
    pub async fn upsert_points(&self, points: Vec<PointStruct>) -> Result<u64, RagError> {
        if points.is_empty() {
            debug!("No points provided for upsert");
            return Ok(0);
        }

        let count = points.len() as u64;
        info!(
            "Upserting {} points into collection '{}'",
            count, self.collection
        );

        let res = self
            .client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        debug!("Upsert operation result={:?}", res.result);
        Ok(count)
    }

    /// Performs a similarity search. Results are ordered by descending score.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        filter: Option<Filter>,
        with_payload: bool,
        exact: bool,
    ) -> Result<Vec<RawHit>, RagError> {
        debug!(
            "Searching in '{}' with top_k={}, with_payload={}, exact={}",
            self.collection, top_k, with_payload, exact
        );

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(with_payload);

        if let Some(f) = filter {
            builder = builder.filter(f);
        }
        if exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let out: Vec<RawHit> = res
            .result
            .into_iter()
            .map(|r| RawHit {
                score: r.score,
                payload: r.payload,
            })
            .collect();

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }
}
