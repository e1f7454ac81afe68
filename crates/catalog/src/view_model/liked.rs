//! View-model for the liked-products screen.

use std::sync::{Arc, Mutex};

use catalog_browser_core::{FavoriteSet, Product, ProductId};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::{Lifecycle, LikedSnapshot};
use crate::api::{CatalogSource, ResourceKind};
use crate::favorites::FavoritesStore;
use crate::lock;
use crate::repository::CatalogRepository;
use crate::store::KeyValueStore;

#[derive(Default)]
struct LikedState {
    products: Vec<Product>,
    refreshing: bool,
}

/// Liked products, in catalog order.
///
/// Products come from the cached snapshot when one exists, so this screen
/// works offline. A load failure shows as an empty list.
pub struct LikedViewModel<S, C> {
    repository: Arc<CatalogRepository<S, C>>,
    favorites: FavoritesStore<S>,
    state: Mutex<LikedState>,
    lifecycle: Lifecycle,
    snapshot_tx: watch::Sender<LikedSnapshot>,
}

impl<S, C> LikedViewModel<S, C>
where
    S: KeyValueStore,
    C: CatalogSource,
{
    pub fn new(repository: Arc<CatalogRepository<S, C>>) -> Self {
        let favorites = FavoritesStore::new(Arc::clone(repository.store()));
        let (snapshot_tx, _) = watch::channel(LikedSnapshot::default());
        Self {
            repository,
            favorites,
            state: Mutex::new(LikedState::default()),
            lifecycle: Lifecycle::default(),
            snapshot_tx,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> LikedSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LikedSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Re-read favorites and products when the screen becomes visible.
    #[instrument(skip(self))]
    pub async fn resume(&self) {
        tokio::join!(self.reload_favorites(), self.load_products());
    }

    /// Pull-to-refresh.
    pub async fn refresh(&self) {
        self.set_refreshing(true);
        self.resume().await;
        self.set_refreshing(false);
    }

    /// Like or unlike a product; unliking removes it from the list.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn toggle_favorite(&self, id: ProductId) -> FavoriteSet {
        self.lifecycle.begin(ResourceKind::Favorites);
        let next = self.favorites.flip(id);
        self.publish();
        self.favorites.persist().await;
        next
    }

    pub fn detach(&self) {
        info!("Liked view detached");
        self.lifecycle.detach();
    }

    async fn reload_favorites(&self) {
        let token = self.lifecycle.begin(ResourceKind::Favorites);
        let installed = self
            .favorites
            .load_if(|| self.lifecycle.is_current(token))
            .await;
        if !installed {
            debug!(generation = token.generation(), "Discarding superseded favorites");
            return;
        }
        self.publish();
    }

    async fn load_products(&self) {
        let token = self.lifecycle.begin(ResourceKind::Products);
        let products = match self.repository.products_cache_first().await {
            Ok(fetched) => fetched.value,
            Err(e) => {
                warn!(error = %e, "Liked products unavailable");
                Vec::new()
            }
        };

        if !self.lifecycle.is_current(token) {
            debug!(generation = token.generation(), "Discarding superseded products");
            return;
        }
        lock(&self.state).products = products;
        self.publish();
    }

    fn set_refreshing(&self, refreshing: bool) {
        if !self.lifecycle.is_attached() {
            return;
        }
        lock(&self.state).refreshing = refreshing;
        self.publish();
    }

    fn publish(&self) {
        let favorites = self.favorites.current();
        let snapshot = {
            let state = lock(&self.state);
            LikedSnapshot {
                items: state
                    .products
                    .iter()
                    .filter(|p| favorites.contains(p.id))
                    .cloned()
                    .collect(),
                favorites,
                refreshing: state.refreshing,
            }
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}
