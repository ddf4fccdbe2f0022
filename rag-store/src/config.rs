//! Runtime and collection configuration.

use crate::errors::RagError;

pub const DEFAULT_QDRANT_URL: &str = "http://127.0.0.1:6334";
pub const DEFAULT_COLLECTION: &str = "products";
pub const DEFAULT_VECTOR_SIZE: usize = 1536;
/// Largest upsert a single Qdrant request carries.
pub const MAX_UPSERT_BATCH: usize = 256;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance (scores in `[-1, 1]`, higher is more similar).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for the vector index.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Expected embedding dimensionality.
    pub vector_size: usize,
    /// Largest number of vectors accepted by one upsert call.
    pub upsert_batch: usize,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
}

impl RagConfig {
    /// Creates a default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            vector_size: DEFAULT_VECTOR_SIZE,
            upsert_batch: MAX_UPSERT_BATCH,
            exact_search: false,
        }
    }

    /// Reads `QDRANT_URL`, `QDRANT_API_KEY`, `QDRANT_COLLECTION` and
    /// `EMBEDDING_DIM` from the process environment.
    pub fn from_env() -> Result<Self, RagError> {
        Self::from_lookup(|k| std::env::var(k).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Same as [`RagConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self, RagError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::new_default(
            get("QDRANT_URL").unwrap_or_else(|| DEFAULT_QDRANT_URL.to_string()),
            get("QDRANT_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        );
        cfg.qdrant_api_key = get("QDRANT_API_KEY");
        if let Some(dim) = get("EMBEDDING_DIM") {
            cfg.vector_size = dim
                .trim()
                .parse()
                .map_err(|_| RagError::Config(format!("EMBEDDING_DIM is not a number: {dim}")))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.vector_size == 0 {
            return Err(RagError::Config("vector_size must be > 0".into()));
        }
        if self.upsert_batch == 0 || self.upsert_batch > MAX_UPSERT_BATCH {
            return Err(RagError::Config(format!(
                "upsert_batch must be in 1..={MAX_UPSERT_BATCH}"
            )));
        }
        Ok(())
    }

    pub fn vector_space(&self) -> VectorSpace {
        VectorSpace {
            size: self.vector_size,
            distance: self.distance,
        }
    }
}
