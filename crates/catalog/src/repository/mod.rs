//! Cache-backed catalog repository.
//!
//! Produces the best available product and category lists, preferring fresh
//! network data and degrading to the last cached snapshot.
//!
//! # Fetch Policy
//!
//! For each resource kind:
//!
//! 1. Fetch from the [`CatalogSource`].
//! 2. On success, write the result through to the store (a failed write is
//!    logged, never returned) and hand it back.
//! 3. On failure, read the cached snapshot. Categories additionally fall back
//!    to the distinct categories of the cached products.
//! 4. With nothing cached, fail with [`RepositoryError::DataUnavailable`].
//!
//! A result is always entirely fresh or entirely the last cached snapshot.
//! Recent network results are also kept in memory for their freshness window
//! and served for [`Freshness::AllowRecent`] loads.

mod hot_cache;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use catalog_browser_core::{CategoryList, Product};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{CatalogSource, NetworkError, ResourceKind};
use crate::config::CatalogConfig;
use crate::store::{self, KeyValueStore, StoreError, keys};

use hot_cache::HotCache;

/// No network result and no usable cached copy.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{resource} unavailable: {source}")]
    DataUnavailable {
        resource: ResourceKind,
        #[source]
        source: NetworkError,
    },
}

impl RepositoryError {
    #[must_use]
    pub const fn resource(&self) -> ResourceKind {
        match self {
            Self::DataUnavailable { resource, .. } => *resource,
        }
    }
}

/// Where a loaded value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Fetched from the network just now.
    Network,
    /// A network result still inside its freshness window.
    Recent,
    /// The last snapshot written to the store.
    Cache,
    /// Inferred from another resource's cached snapshot.
    Derived,
}

/// A loaded value tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Fetched<T> {
    const fn new(value: T, origin: Origin) -> Self {
        Self { value, origin }
    }

    /// Whether the value may be older than the remote source.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self.origin, Origin::Cache | Origin::Derived)
    }
}

/// How recent a load result must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Reuse a network result still inside its freshness window.
    #[default]
    AllowRecent,
    /// Always go to the network first.
    Network,
}

/// Sequence numbers for network fetches.
///
/// A fetch that completes after a newer fetch of the same resource has
/// already been written is still returned to its caller, but never replaces
/// the newer snapshot.
#[derive(Debug, Default)]
struct WriteOrder {
    issued: AtomicU64,
    // Held across the write so snapshots land in sequence order
    written: tokio::sync::Mutex<WrittenSeq>,
}

#[derive(Debug, Default)]
struct WrittenSeq {
    products: u64,
    categories: u64,
}

impl WriteOrder {
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Repository combining a catalog source with a persistent snapshot cache.
pub struct CatalogRepository<S, C> {
    source: C,
    store: Arc<S>,
    recent: HotCache,
    order: WriteOrder,
}

impl<S, C> CatalogRepository<S, C>
where
    S: KeyValueStore,
    C: CatalogSource,
{
    /// Create a repository over `source`, caching into `store`.
    pub fn new(source: C, store: Arc<S>, config: &CatalogConfig) -> Self {
        Self {
            source,
            store,
            recent: HotCache::new(config.products_stale_after, config.categories_stale_after),
            order: WriteOrder::default(),
        }
    }

    /// The catalog source.
    #[must_use]
    pub const fn source(&self) -> &C {
        &self.source
    }

    /// The shared backing store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Load the product list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataUnavailable` if the fetch failed and no
    /// cached snapshot exists.
    #[instrument(skip(self))]
    pub async fn products(
        &self,
        freshness: Freshness,
    ) -> Result<Fetched<Vec<Product>>, RepositoryError> {
        if freshness == Freshness::AllowRecent
            && let Some(products) = self.recent.products().await
        {
            debug!("Serving recent products from memory");
            return Ok(Fetched::new(products, Origin::Recent));
        }

        match self.fetch_products().await {
            Ok(products) => Ok(Fetched::new(products, Origin::Network)),
            Err(err) => {
                warn!(error = %err, "Products fetch failed, falling back to cache");
                if let Some(cached) = self.cached_products().await {
                    info!(count = cached.len(), "Serving cached products");
                    return Ok(Fetched::new(cached, Origin::Cache));
                }
                error!(error = %err, "No cached products available");
                Err(RepositoryError::DataUnavailable {
                    resource: ResourceKind::Products,
                    source: err,
                })
            }
        }
    }

    /// Load the category list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataUnavailable` if the fetch failed and
    /// neither a categories snapshot nor a products snapshot exists.
    #[instrument(skip(self))]
    pub async fn categories(
        &self,
        freshness: Freshness,
    ) -> Result<Fetched<CategoryList>, RepositoryError> {
        if freshness == Freshness::AllowRecent
            && let Some(categories) = self.recent.categories().await
        {
            debug!("Serving recent categories from memory");
            return Ok(Fetched::new(categories, Origin::Recent));
        }

        let err = match self.fetch_categories().await {
            Ok(categories) => return Ok(Fetched::new(categories, Origin::Network)),
            Err(err) => err,
        };

        warn!(error = %err, "Categories fetch failed, falling back to cache");
        if let Some(cached) =
            store::read_json::<_, CategoryList>(self.store.as_ref(), keys::CATEGORIES_CACHE).await
        {
            info!(count = cached.len(), "Serving cached categories");
            return Ok(Fetched::new(cached, Origin::Cache));
        }

        if let Some(products) = self.cached_products().await {
            let derived = CategoryList::from_products(&products);
            info!(
                count = derived.len(),
                "Derived categories from cached products"
            );
            return Ok(Fetched::new(derived, Origin::Derived));
        }

        error!(error = %err, "No cached categories available");
        Err(RepositoryError::DataUnavailable {
            resource: ResourceKind::Categories,
            source: err,
        })
    }

    /// Load products, preferring the cached snapshot over the network.
    ///
    /// Used by views that only annotate products (the liked list) and do not
    /// need the freshest catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataUnavailable` if nothing is cached and the
    /// fetch failed.
    #[instrument(skip(self))]
    pub async fn products_cache_first(&self) -> Result<Fetched<Vec<Product>>, RepositoryError> {
        if let Some(cached) = self.cached_products().await {
            debug!(count = cached.len(), "Serving cached products");
            return Ok(Fetched::new(cached, Origin::Cache));
        }

        self.fetch_products()
            .await
            .map(|products| Fetched::new(products, Origin::Network))
            .map_err(|source| RepositoryError::DataUnavailable {
                resource: ResourceKind::Products,
                source,
            })
    }

    /// The last product snapshot written to the store, if any.
    pub async fn cached_products(&self) -> Option<Vec<Product>> {
        store::read_json(self.store.as_ref(), keys::PRODUCTS_CACHE).await
    }

    /// Evict the product and category snapshots, persisted and in memory.
    ///
    /// Favorites live under their own key and are not affected.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a snapshot cannot be removed.
    #[instrument(skip(self))]
    pub async fn clear_cache(&self) -> Result<(), StoreError> {
        self.recent.clear().await;
        self.store.remove(keys::PRODUCTS_CACHE).await?;
        self.store.remove(keys::CATEGORIES_CACHE).await?;
        info!("Catalog cache cleared");
        Ok(())
    }

    /// Fetch products from the source and write them through on success,
    /// unless a newer fetch has already been written.
    async fn fetch_products(&self) -> Result<Vec<Product>, NetworkError> {
        let seq = self.order.issue();
        let products = self.source.fetch_products().await?;
        info!(count = products.len(), "Fetched products from network");

        let mut written = self.order.written.lock().await;
        if written.products > seq {
            debug!(
                seq,
                newer = written.products,
                "Superseded products fetch, keeping newer snapshot"
            );
            return Ok(products);
        }
        written.products = seq;
        self.write_through(keys::PRODUCTS_CACHE, products.as_slice())
            .await;
        self.recent.insert_products(products.clone()).await;
        Ok(products)
    }

    /// Fetch categories from the source and write them through on success,
    /// unless a newer fetch has already been written.
    async fn fetch_categories(&self) -> Result<CategoryList, NetworkError> {
        let seq = self.order.issue();
        let categories = self.source.fetch_categories().await?;
        info!(count = categories.len(), "Fetched categories from network");

        let mut written = self.order.written.lock().await;
        if written.categories > seq {
            debug!(
                seq,
                newer = written.categories,
                "Superseded categories fetch, keeping newer snapshot"
            );
            return Ok(categories);
        }
        written.categories = seq;
        self.write_through(keys::CATEGORIES_CACHE, categories.as_slice())
            .await;
        self.recent.insert_categories(categories.clone()).await;
        Ok(categories)
    }

    /// Persist a fresh snapshot; failures are logged and swallowed.
    async fn write_through<T>(&self, key: &'static str, value: &T)
    where
        T: serde::Serialize + Sync + ?Sized,
    {
        if let Err(e) = store::write_json(self.store.as_ref(), key, value).await {
            warn!(error = %e, "Failed to persist cache snapshot");
        }
    }
}
