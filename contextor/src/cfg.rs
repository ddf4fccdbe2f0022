//! Runtime configuration loaded from environment variables.

use std::{str::FromStr, time::Duration};

use rag_store::MAX_UPSERT_BATCH;

use crate::error::ContextorError;
use crate::filter::DEFAULT_THRESHOLD;

pub const DEFAULT_NAMESPACE: &str = "product-namespace";

/// Knobs for the search pipeline and the indexing job.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Index partition shared by queries and indexing.
    pub namespace: String,
    pub top_k: u64,
    pub threshold: f32,
    /// Upper bound for each embed / query / complete call.
    pub step_timeout: Duration,
    pub index_batch_size: usize,
    /// Concurrent embedding calls during indexing.
    pub index_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            top_k: 3,
            threshold: DEFAULT_THRESHOLD,
            step_timeout: Duration::from_secs(30),
            index_batch_size: 10,
            index_concurrency: 4,
        }
    }
}

impl PipelineConfig {
    /// Build from environment variables with defaults.
    ///
    /// # Errors
    /// [`ContextorError::Config`] for values that do not parse or are out of range.
    pub fn from_env() -> Result<Self, ContextorError> {
        Self::from_lookup(|k| std::env::var(k).ok().filter(|v| !v.trim().is_empty()))
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ContextorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let cfg = Self {
            namespace: get("VECTOR_NAMESPACE").unwrap_or(d.namespace),
            top_k: parse(&get, "RAG_TOP_K", d.top_k)?,
            threshold: parse(&get, "RELEVANCE_THRESHOLD", d.threshold)?,
            step_timeout: Duration::from_secs(parse(
                &get,
                "PIPELINE_STEP_TIMEOUT_SECS",
                d.step_timeout.as_secs(),
            )?),
            index_batch_size: parse(&get, "INDEX_BATCH_SIZE", d.index_batch_size)?,
            index_concurrency: parse(&get, "INDEX_CONCURRENCY", d.index_concurrency)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ContextorError> {
        if self.top_k == 0 {
            return Err(ContextorError::Config("RAG_TOP_K must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ContextorError::Config(
                "RELEVANCE_THRESHOLD must be within 0..=1".into(),
            ));
        }
        if self.step_timeout.is_zero() {
            return Err(ContextorError::Config(
                "PIPELINE_STEP_TIMEOUT_SECS must be > 0".into(),
            ));
        }
        if self.index_batch_size == 0 || self.index_concurrency == 0 {
            return Err(ContextorError::Config(
                "INDEX_BATCH_SIZE and INDEX_CONCURRENCY must be > 0".into(),
            ));
        }
        // One indexing batch is one index write.
        if self.index_batch_size > MAX_UPSERT_BATCH {
            return Err(ContextorError::Config(format!(
                "INDEX_BATCH_SIZE must be <= {MAX_UPSERT_BATCH}"
            )));
        }
        Ok(())
    }
}

fn parse<F, T>(get: &F, key: &str, default: T) -> Result<T, ContextorError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ContextorError::Config(format!("{key} has invalid value '{v}'"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_query_path() {
        let cfg = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.namespace, "product-namespace");
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.threshold, 0.8);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = PipelineConfig::from_lookup(|k| match k {
            "RELEVANCE_THRESHOLD" => Some("0.75".into()),
            "INDEX_BATCH_SIZE" => Some("50".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.threshold, 0.75);
        assert_eq!(cfg.index_batch_size, 50);
    }

    #[test]
    fn index_batch_size_may_reach_the_upsert_limit() {
        let cfg = PipelineConfig::from_lookup(|k| {
            (k == "INDEX_BATCH_SIZE").then(|| MAX_UPSERT_BATCH.to_string())
        })
        .unwrap();
        assert_eq!(cfg.index_batch_size, MAX_UPSERT_BATCH);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for (k, v) in [
            ("RAG_TOP_K", "three"),
            ("RAG_TOP_K", "0"),
            ("RELEVANCE_THRESHOLD", "1.5"),
            ("PIPELINE_STEP_TIMEOUT_SECS", "0"),
            ("INDEX_BATCH_SIZE", "300"),
        ] {
            let err = PipelineConfig::from_lookup(|key| (key == k).then(|| v.to_string()));
            assert!(matches!(err, Err(ContextorError::Config(_))), "{k}={v}");
        }
    }
}
