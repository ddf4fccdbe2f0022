use std::sync::Arc;

use ai_llm_service::{
    config::default_config::profiles_from_env,
    service_profiles::{LlmServiceProfiles, Profile},
};
use catalog::Catalog;
use contextor::{
    ConversationStore, FineTunedAssistant, IndexingJob, PipelineConfig, SearchPipeline,
    adapters::{ProfileCompleter, ProfileEmbedder},
};
use rag_store::{RagConfig, RagStore};
use tracing::info;

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SearchPipeline>,
    pub indexer: Arc<IndexingJob>,
    pub tuning: Arc<FineTunedAssistant>,
    /// Loaded once at startup, read-only afterwards.
    pub catalog: Arc<Catalog>,
    /// Provider profiles for `/health`; absent when handlers run on test doubles.
    pub llm: Option<Arc<LlmServiceProfiles>>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<SearchPipeline>,
        indexer: Arc<IndexingJob>,
        tuning: Arc<FineTunedAssistant>,
        catalog: Arc<Catalog>,
        llm: Option<Arc<LlmServiceProfiles>>,
    ) -> Self {
        Self {
            pipeline,
            indexer,
            tuning,
            catalog,
            llm,
        }
    }

    /// Builds the production wiring from environment variables.
    ///
    /// # Errors
    /// Any missing or invalid setting, or a catalog file that cannot be read.
    pub fn from_env() -> Result<Self, AppError> {
        let llm = Arc::new(LlmServiceProfiles::new(profiles_from_env()?, None)?);
        let store = Arc::new(RagStore::new(RagConfig::from_env()?)?);
        let catalog = Arc::new(Catalog::load_from_env()?);
        let cfg = PipelineConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;

        info!(
            namespace = %cfg.namespace,
            collection = %store.config().collection,
            search_model = %llm.config(Profile::Search).model,
            fine_tuned_model = %llm.config(Profile::FineTuned).model,
            embedding_model = %llm.embedding_config().model,
            "wiring search pipeline"
        );

        let embedder = Arc::new(ProfileEmbedder::new(llm.clone()));
        let pipeline = SearchPipeline::new(
            embedder.clone(),
            store.clone(),
            Arc::new(ProfileCompleter::new(llm.clone(), Profile::Search)),
            catalog.clone(),
            Arc::new(ConversationStore::new()),
            cfg.clone(),
        );
        let indexer = IndexingJob::new(catalog.clone(), embedder, store, cfg.clone());
        let tuning = FineTunedAssistant::new(
            Arc::new(ProfileCompleter::new(llm.clone(), Profile::FineTuned)),
            cfg.step_timeout,
        );

        Ok(Self::new(
            Arc::new(pipeline),
            Arc::new(indexer),
            Arc::new(tuning),
            catalog,
            Some(llm),
        ))
    }
}
