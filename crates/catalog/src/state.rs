//! Services shared across screens.

use std::sync::Arc;

use tracing::info;

use crate::api::{CatalogSource, RemoteCatalogClient};
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::repository::CatalogRepository;
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::view_model::{CatalogViewModel, LikedViewModel};

/// Catalog services shared by every screen.
///
/// This struct is cheaply cloneable via `Arc`. All view-models created from
/// one instance share a repository (and with it the in-memory freshness
/// cache) and a backing store, so a like on one screen is visible on the
/// other after it resumes.
pub struct CatalogServices<S, C> {
    inner: Arc<CatalogServicesInner<S, C>>,
}

struct CatalogServicesInner<S, C> {
    config: CatalogConfig,
    repository: Arc<CatalogRepository<S, C>>,
}

impl<S, C> Clone for CatalogServices<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C> CatalogServices<S, C>
where
    S: KeyValueStore,
    C: CatalogSource,
{
    /// Wire services over an arbitrary source and store.
    pub fn new(config: CatalogConfig, source: C, store: S) -> Self {
        let repository = Arc::new(CatalogRepository::new(source, Arc::new(store), &config));
        Self {
            inner: Arc::new(CatalogServicesInner { config, repository }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<CatalogRepository<S, C>> {
        &self.inner.repository
    }

    /// A fresh view-model for the catalog screen.
    #[must_use]
    pub fn catalog_view(&self) -> CatalogViewModel<S, C> {
        CatalogViewModel::new(Arc::clone(&self.inner.repository), &self.inner.config)
    }

    /// A fresh view-model for the liked-products screen.
    #[must_use]
    pub fn liked_view(&self) -> LikedViewModel<S, C> {
        LikedViewModel::new(Arc::clone(&self.inner.repository))
    }
}

impl CatalogServices<FileStore, RemoteCatalogClient> {
    /// Open services persisting under `config.store_dir`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if no store directory is configured, the
    /// directory cannot be created, or the HTTP client cannot be built.
    pub async fn open(config: CatalogConfig) -> Result<Self, CatalogError> {
        let dir = config
            .store_dir
            .clone()
            .ok_or(CatalogError::MissingStoreDir)?;
        let store = FileStore::open(&dir).await?;
        let client = RemoteCatalogClient::new(&config)?;
        info!(store_dir = %dir.display(), "Catalog services opened");
        Ok(Self::new(config, client, store))
    }
}

impl CatalogServices<MemoryStore, RemoteCatalogClient> {
    /// Services that forget everything on exit.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::HttpClient` if the HTTP client cannot be built.
    pub fn in_memory(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = RemoteCatalogClient::new(&config)?;
        Ok(Self::new(config, client, MemoryStore::new()))
    }
}
