//! Error types for catalog loading.

use std::path::PathBuf;

/// Errors that can occur while building a catalog from external data.
///
/// Lookups and inserts never fail with an error: a missing id is `None`,
/// a rejected insert is `false`.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog JSON is malformed or has the wrong shape.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}
