//! Error taxonomy for the catalog core.
//!
//! - [`NetworkError`] - transport, HTTP status or decode failure of one fetch
//! - [`RepositoryError`] - no network result and no usable cache; the only
//!   load error a view-model ever sees
//! - [`PersistenceWriteError`] - a best-effort store write failed; logged and
//!   swallowed, never shown to the user
//! - [`CatalogError`] - wiring failures while opening a catalog

use thiserror::Error;

pub use crate::api::NetworkError;
use crate::config::ConfigError;
pub use crate::repository::RepositoryError;
use crate::store::StoreError;

/// A best-effort write to the key-value store failed.
#[derive(Debug, Error)]
pub enum PersistenceWriteError {
    #[error("failed to encode value for {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {key}: {source}")]
    Store {
        key: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Errors that can occur while opening a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The backing store could not be opened.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A file-backed catalog was requested without a store directory.
    #[error("Missing store directory (set CATALOG_STORE_DIR)")]
    MissingStoreDir,
}
