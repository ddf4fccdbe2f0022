//! Load-once catalog of eSIM products and Q&A entries.
//!
//! The catalog is read from two JSON files at startup and is immutable
//! afterwards. Lookups by id are O(1); iteration follows load order
//! (eSIMs first, then Q&A entries).

mod document;
mod errors;
mod record;
mod source;

pub use document::IndexDocument;
pub use errors::CatalogError;
pub use record::{CatalogRecord, ESIM_KIND, RawAttributes};

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

pub const DEFAULT_ESIMS_PATH: &str = "data/esims.json";
pub const DEFAULT_QUESTIONS_PATH: &str = "data/questions.json";

/// Immutable id-indexed catalog.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Reads both catalog files.
    ///
    /// # Errors
    /// Returns [`CatalogError`] if a file is missing or malformed.
    pub fn load(esims: impl AsRef<Path>, questions: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let esims = esims.as_ref();
        let questions = questions.as_ref();

        let mut records = source::parse_esims(&read(esims)?, &esims.display().to_string())?;
        let esim_count = records.len();
        records.extend(source::parse_questions(
            &read(questions)?,
            &questions.display().to_string(),
        )?);

        let catalog = Self::from_records(records);
        info!(
            esims = esim_count,
            total = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Reads `CATALOG_ESIMS_PATH` / `CATALOG_QUESTIONS_PATH`, falling back to
    /// the files under `data/`.
    pub fn load_from_env() -> Result<Self, CatalogError> {
        let esims = env_path("CATALOG_ESIMS_PATH", DEFAULT_ESIMS_PATH);
        let questions = env_path("CATALOG_QUESTIONS_PATH", DEFAULT_QUESTIONS_PATH);
        debug!(?esims, ?questions, "loading catalog");
        Self::load(esims, questions)
    }

    /// Builds a catalog from records in order. Duplicate ids keep the first
    /// occurrence.
    pub fn from_records(records: impl IntoIterator<Item = CatalogRecord>) -> Self {
        let mut out = Self::default();
        for r in records {
            if out.by_id.contains_key(&r.id) {
                warn!(id = %r.id, "duplicate catalog id ignored");
                continue;
            }
            out.by_id.insert(r.id.clone(), out.records.len());
            out.records.push(r);
        }
        out
    }

    pub fn find_by_id(&self, id: &str) -> Option<&CatalogRecord> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
