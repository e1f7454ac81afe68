//! View-models consumed by the presentation layer.
//!
//! # Architecture
//!
//! - [`CatalogViewModel`] - product list with search, category filter, price
//!   sort and incremental "load more"
//! - [`LikedViewModel`] - products the user has liked
//!
//! Both expose a query surface (a [`tokio::sync::watch`] channel of
//! snapshots, plus a direct `snapshot()` accessor) and a command surface
//! (plain methods). Commands take `&self` and may be interleaved freely;
//! state locks are never held across an await.
//!
//! # Ordering
//!
//! Each suspending load is tagged with a [`RequestToken`]. When it resumes,
//! its result is applied only if no newer load for the same resource has
//! started and the view has not been detached.

mod lifecycle;
mod liked;
mod snapshot;

use std::future::Future;
use std::sync::{Arc, Mutex};

use catalog_browser_core::{
    CategoryList, FavoriteSet, Product, ProductId, QueryState, filtered, filtered_count,
};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::api::{CatalogSource, ResourceKind};
use crate::config::CatalogConfig;
use crate::favorites::FavoritesStore;
use crate::lock;
use crate::repository::{CatalogRepository, Freshness, RepositoryError};
use crate::store::KeyValueStore;

pub use lifecycle::{Lifecycle, RequestToken};
pub use liked::LikedViewModel;
pub use snapshot::{CatalogSnapshot, LikedSnapshot, LoadError, PaginationState, ViewCommand};

const COMMAND_CAPACITY: usize = 16;

/// Mutable state behind the catalog screen.
struct CatalogState {
    /// Latest successfully loaded product list.
    products: Option<Vec<Product>>,
    products_stale: bool,
    categories: CategoryList,
    query: QueryState,
    loading: bool,
    refreshing: bool,
    error: Option<LoadError>,
}

impl CatalogState {
    fn new(page_size: usize) -> Self {
        Self {
            products: None,
            products_stale: false,
            categories: CategoryList::default(),
            query: QueryState::new(page_size),
            loading: false,
            refreshing: false,
            error: None,
        }
    }

    fn products(&self) -> &[Product] {
        self.products.as_deref().unwrap_or_default()
    }

    fn snapshot(&self, favorites: FavoriteSet) -> CatalogSnapshot {
        let mut items = filtered(self.products(), &self.query);
        let filtered_count = items.len();
        items.truncate(self.query.visible_count);

        CatalogSnapshot {
            items,
            filtered_count,
            pagination: PaginationState::from_counts(self.query.visible_count, filtered_count),
            category_options: self.categories.options(),
            query: self.query.clone(),
            favorites,
            loading: self.loading,
            refreshing: self.refreshing,
            error: self.error.clone(),
            stale: self.products_stale,
        }
    }
}

/// View-model for the browsable product list.
pub struct CatalogViewModel<S, C> {
    repository: Arc<CatalogRepository<S, C>>,
    favorites: FavoritesStore<S>,
    page_size: usize,
    fetch_retries: u32,
    state: Mutex<CatalogState>,
    lifecycle: Lifecycle,
    snapshot_tx: watch::Sender<CatalogSnapshot>,
    commands_tx: broadcast::Sender<ViewCommand>,
}

impl<S, C> CatalogViewModel<S, C>
where
    S: KeyValueStore,
    C: CatalogSource,
{
    /// Create a view-model over a shared repository.
    ///
    /// Nothing is loaded until [`Self::resume`] is called.
    pub fn new(repository: Arc<CatalogRepository<S, C>>, config: &CatalogConfig) -> Self {
        let page_size = config.page_size.get();
        let favorites = FavoritesStore::new(Arc::clone(repository.store()));
        let state = CatalogState::new(page_size);
        let (snapshot_tx, _) = watch::channel(state.snapshot(FavoriteSet::new()));
        let (commands_tx, _) = broadcast::channel(COMMAND_CAPACITY);

        Self {
            repository,
            favorites,
            page_size,
            fetch_retries: config.fetch_retries,
            state: Mutex::new(state),
            lifecycle: Lifecycle::default(),
            snapshot_tx,
            commands_tx,
        }
    }

    // =========================================================================
    // Query surface
    // =========================================================================

    /// The current view state.
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Watch the view state; a new value is published after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Receive view commands such as [`ViewCommand::ScrollToTop`].
    #[must_use]
    pub fn commands(&self) -> broadcast::Receiver<ViewCommand> {
        self.commands_tx.subscribe()
    }

    /// The favorites store backing this view.
    #[must_use]
    pub const fn favorites(&self) -> &FavoritesStore<S> {
        &self.favorites
    }

    // =========================================================================
    // Command surface
    // =========================================================================

    /// Reconcile with storage and the network when the screen becomes
    /// visible, including the first time.
    ///
    /// Favorites are re-read from the store to pick up changes made by other
    /// screens. Products and categories still inside their freshness window
    /// are not refetched.
    #[instrument(skip(self))]
    pub async fn resume(&self) {
        tokio::join!(
            self.reload_favorites(),
            self.load_products(Freshness::AllowRecent),
            self.load_categories(Freshness::AllowRecent),
        );
    }

    /// Pull-to-refresh: refetch products and categories from the network.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        tokio::join!(
            self.load_products(Freshness::Network),
            self.load_categories(Freshness::Network),
        );
    }

    /// Repeat a failed load.
    pub async fn retry(&self) {
        self.refresh().await;
    }

    /// Change the search text. Resets pagination if the text changed.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.mutate_query(|query| {
            if query.search_text == text {
                return false;
            }
            query.search_text = text;
            true
        });
    }

    /// Select a category label or `"All"`. Resets pagination if it changed.
    pub fn set_category(&self, label: impl Into<String>) {
        let label = label.into();
        self.mutate_query(|query| {
            if query.selected_category == label {
                return false;
            }
            query.selected_category = label;
            true
        });
    }

    /// Flip the price ordering. Always resets pagination.
    pub fn toggle_sort_direction(&self) {
        self.mutate_query(|query| {
            query.sort_direction = query.sort_direction.toggled();
            true
        });
    }

    /// Reveal the next page.
    ///
    /// Returns `false` without changing anything when no product matches or
    /// every match is already visible.
    pub fn load_more(&self) -> bool {
        if !self.lifecycle.is_attached() {
            return false;
        }

        let page_size = self.page_size;
        self.update(|state| {
            let total = filtered_count(state.products(), &state.query);
            let visible = state.query.visible_count;
            if total == 0 || visible >= total {
                return false;
            }
            state.query.visible_count = visible.saturating_add(page_size).min(total);
            debug!(visible = state.query.visible_count, total, "Loaded more products");
            true
        })
    }

    /// Like or unlike a product.
    ///
    /// The new set is published immediately; persisting happens afterwards
    /// and its failure is only logged.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn toggle_favorite(&self, id: ProductId) -> FavoriteSet {
        // An outstanding reload read the store before this toggle
        self.lifecycle.begin(ResourceKind::Favorites);
        let next = self.favorites.flip(id);
        self.publish();
        self.favorites.persist().await;
        next
    }

    /// Tear the view down. Loads still in flight are discarded when they
    /// complete, and further commands are ignored.
    pub fn detach(&self) {
        info!("Catalog view detached");
        self.lifecycle.detach();
    }

    // =========================================================================
    // Loads
    // =========================================================================

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

    async fn load_products(&self, freshness: Freshness) {
        let token = self.lifecycle.begin(ResourceKind::Products);
        self.update(|state| {
            if state.products.is_some() {
                state.refreshing = freshness == Freshness::Network;
            } else {
                state.loading = true;
            }
        });

        let result = retrying(self.fetch_retries, &self.lifecycle, || {
            self.repository.products(freshness)
        })
        .await;

        if !self.lifecycle.is_current(token) {
            debug!(generation = token.generation(), "Discarding superseded products");
            return;
        }

        self.update(|state| {
            state.loading = false;
            state.refreshing = false;
            match result {
                Ok(fetched) => {
                    state.products_stale = fetched.is_stale();
                    state.products = Some(fetched.value);
                    state.error = None;
                }
                Err(e) if state.products.is_none() => {
                    state.error = Some(LoadError::from(&e));
                }
                Err(e) => {
                    // Keep showing what we have
                    warn!(error = %e, "Products reload failed");
                }
            }
        });
    }

    async fn load_categories(&self, freshness: Freshness) {
        let token = self.lifecycle.begin(ResourceKind::Categories);

        let result = retrying(self.fetch_retries, &self.lifecycle, || {
            self.repository.categories(freshness)
        })
        .await;

        if !self.lifecycle.is_current(token) {
            debug!(generation = token.generation(), "Discarding superseded categories");
            return;
        }

        match result {
            Ok(fetched) => self.update(|state| state.categories = fetched.value),
            Err(e) => warn!(error = %e, "Categories unavailable"),
        }
    }

    // =========================================================================
    // State helpers
    // =========================================================================

    /// Apply a query change; on change, reset pagination and scroll to top.
    fn mutate_query(&self, change: impl FnOnce(&mut QueryState) -> bool) {
        if !self.lifecycle.is_attached() {
            return;
        }

        let page_size = self.page_size;
        let changed = self.update(|state| {
            let changed = change(&mut state.query);
            if changed {
                state.query.visible_count = page_size;
            }
            changed
        });

        if changed {
            // No subscribers is fine
            let _ = self.commands_tx.send(ViewCommand::ScrollToTop);
        }
    }

    /// Mutate state and publish the resulting snapshot.
    fn update<R>(&self, f: impl FnOnce(&mut CatalogState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = lock(&self.state);
            let result = f(&mut state);
            (result, state.snapshot(self.favorites.current()))
        };
        self.snapshot_tx.send_replace(snapshot);
        result
    }

    fn publish(&self) {
        self.update(|_| ());
    }
}

/// Run a repository load, retrying failures up to `retries` extra times while
/// the view is attached.
async fn retrying<T, F, Fut>(
    retries: u32,
    lifecycle: &Lifecycle,
    mut attempt: F,
) -> Result<T, RepositoryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RepositoryError>>,
{
    let mut remaining = retries;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if remaining > 0 && lifecycle.is_attached() => {
                remaining -= 1;
                warn!(
                    resource = %e.resource(),
                    error = %e,
                    remaining,
                    "Load failed, retrying"
                );
            }
            Err(e) => return Err(e),
        }
    }
}
