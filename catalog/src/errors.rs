//! Catalog loading errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Source file could not be read.
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file is not the expected JSON shape.
    #[error("failed to parse catalog file {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record had no usable identifier.
    #[error("record #{index} in {origin} has no id")]
    MissingId { origin: String, index: usize },
}
