//! Catalog indexing job: embed every record and upsert it into the namespace
//! the search pipeline queries.

use std::{sync::Arc, time::Instant};

use catalog::{Catalog, IndexDocument};
use futures::{StreamExt, TryStreamExt, stream};
use rag_store::IndexVector;
use tracing::{debug, info, instrument, warn};

use crate::{
    api_types::IndexStats,
    capabilities::{EmbeddingClient, VectorIndex},
    cfg::PipelineConfig,
    error::ContextorError,
    pipeline::{Stage, bounded},
};

pub struct IndexingJob {
    catalog: Arc<Catalog>,
    embedder: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    cfg: PipelineConfig,
}

impl IndexingJob {
    pub fn new(
        catalog: Arc<Catalog>,
        embedder: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        cfg: PipelineConfig,
    ) -> Self {
        Self {
            catalog,
            embedder,
            index,
            cfg,
        }
    }

    /// Indexes the whole catalog in load order.
    ///
    /// Records are embedded with bounded concurrency and upserted in batches
    /// of `index_batch_size`. The first failure aborts the run; batches
    /// already written stay in the index.
    ///
    /// # Errors
    /// [`ContextorError::Provider`] for failed embedding or upsert calls.
    #[instrument(skip_all, fields(namespace = %self.cfg.namespace))]
    pub async fn run(&self) -> Result<IndexStats, ContextorError> {
        let started = Instant::now();
        let limit = self.cfg.step_timeout;

        bounded(Stage::Upserting, limit, self.index.prepare()).await?;

        let (docs, skipped): (Vec<IndexDocument>, Vec<IndexDocument>) = self
            .catalog
            .iter()
            .map(|r| r.to_index_document())
            .partition(|d| !d.embed_text.trim().is_empty());
        for d in &skipped {
            warn!(id = %d.id, "record has no text to embed, skipped");
        }

        let mut stats = IndexStats {
            skipped: skipped.len() as u64,
            ..Default::default()
        };

        for batch in docs.chunks(self.cfg.index_batch_size) {
            // `buffered` keeps the batch in catalog order.
            let vectors: Vec<IndexVector> = stream::iter(0..batch.len())
                .map(|i| {
                    let d = &batch[i];
                    async move {
                        let values =
                            bounded(Stage::Embedding, limit, self.embedder.embed(&d.embed_text))
                                .await?;
                        Ok::<_, ContextorError>(IndexVector {
                            id: d.id.clone(),
                            values,
                            metadata: d.metadata.clone(),
                        })
                    }
                })
                .buffered(self.cfg.index_concurrency)
                .try_collect()
                .await?;

            let written = bounded(
                Stage::Upserting,
                limit,
                self.index.upsert(&self.cfg.namespace, vectors),
            )
            .await?;

            stats.indexed += written;
            stats.batches += 1;
            debug!(batch = stats.batches, written, "batch upserted");
        }

        stats.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            indexed = stats.indexed,
            batches = stats.batches,
            skipped = stats.skipped,
            duration_ms = stats.duration_ms,
            "catalog indexed"
        );
        Ok(stats)
    }
}
