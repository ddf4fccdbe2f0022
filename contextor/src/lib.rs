//! Retrieval-augmented product query core.
//!
//! Public entry points:
//! - [`SearchPipeline::run`]: embed → search → enrich → filter → compose → complete
//! - [`IndexingJob::run`]: embed the catalog and upsert it into the index
//! - [`FineTunedAssistant::ask`]: fine-tuned model without retrieval
//!
//! External systems are reached through the traits in [`capabilities`];
//! [`adapters`] binds them to `ai-llm-service` and `rag-store`, [`mock`]
//! provides doubles for tests.

pub mod adapters;
pub mod capabilities;
pub mod cfg;
mod error;
pub mod filter;
pub mod history;
mod indexing;
pub mod mock;
pub mod pipeline;
pub mod prompt;
mod tuning;

mod api_types;

pub use api_types::{
    IndexStats, SearchMatch, SearchRequest, SearchResponse, TuningRequest, TuningResponse,
};
pub use cfg::PipelineConfig;
pub use error::ContextorError;
pub use history::{ConversationStore, ConversationTurn, TurnRole};
pub use indexing::IndexingJob;
pub use pipeline::{SearchPipeline, Stage};
pub use tuning::{FineTunedAssistant, PROMPT_REQUIRED};
