//! Persisted set of liked products.
//!
//! Favorites live under their own store key and are managed independently of
//! the catalog cache: evicting cached products never drops a like, and a like
//! survives its product disappearing from the catalog.
//!
//! The in-memory set is the source of truth between loads. Persisting is best
//! effort: a failed write is logged and the toggle stands.

use std::sync::{Arc, Mutex};

use catalog_browser_core::{FavoriteSet, ProductId};
use tracing::{debug, instrument, warn};

use crate::error::PersistenceWriteError;
use crate::lock;
use crate::store::{self, KeyValueStore, keys};

/// Liked product ids backed by a key-value store.
pub struct FavoritesStore<S> {
    store: Arc<S>,
    current: Mutex<FavoriteSet>,
    // Serializes writes and reloads: the last write carries the latest set
    // and a reload never reads ahead of a pending write.
    io_lock: tokio::sync::Mutex<()>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Create an empty favorites store; call [`Self::load`] to read persisted
    /// favorites.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            current: Mutex::new(FavoriteSet::new()),
            io_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Read the persisted set without touching the in-memory one.
    ///
    /// Missing or malformed data reads as an empty set.
    pub async fn read(&self) -> FavoriteSet {
        store::read_json(self.store.as_ref(), keys::FAVORITES)
            .await
            .unwrap_or_default()
    }

    /// Reload from the store, replacing the in-memory set.
    ///
    /// Waits for an in-flight write to land first, so a toggle still being
    /// persisted is read back instead of overwritten.
    #[instrument(skip(self))]
    pub async fn load(&self) -> FavoriteSet {
        let _guard = self.io_lock.lock().await;
        let set = self.read().await;
        debug!(count = set.len(), "Loaded favorites");
        self.replace(set.clone());
        set
    }

    /// Reload like [`Self::load`], installing the set only if `still_wanted`
    /// holds once the read completes. Returns whether it was installed.
    pub(crate) async fn load_if(&self, still_wanted: impl FnOnce() -> bool) -> bool {
        let _guard = self.io_lock.lock().await;
        let set = self.read().await;
        if !still_wanted() {
            return false;
        }
        debug!(count = set.len(), "Reloaded favorites");
        self.replace(set);
        true
    }

    /// Flip membership of `id` and persist the result.
    ///
    /// Returns the new set. A failed write is logged, not returned.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn toggle(&self, id: ProductId) -> FavoriteSet {
        let next = self.flip(id);
        self.persist().await;
        next
    }

    /// Whether `id` is currently liked.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        lock(&self.current).contains(id)
    }

    /// A copy of the in-memory set.
    #[must_use]
    pub fn current(&self) -> FavoriteSet {
        lock(&self.current).clone()
    }

    /// Flip membership in memory only.
    pub(crate) fn flip(&self, id: ProductId) -> FavoriteSet {
        let mut current = lock(&self.current);
        let liked = current.toggle(id);
        debug!(id = %id, liked, "Toggled favorite");
        current.clone()
    }

    /// Replace the in-memory set.
    pub(crate) fn replace(&self, set: FavoriteSet) {
        *lock(&self.current) = set;
    }

    /// Write the current in-memory set, swallowing failures.
    pub(crate) async fn persist(&self) {
        if let Err(e) = self.try_persist().await {
            warn!(error = %e, "Failed to persist favorites");
        }
    }

    /// Write the current in-memory set.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceWriteError` if encoding or the store write fails.
    pub async fn try_persist(&self) -> Result<(), PersistenceWriteError> {
        let _guard = self.io_lock.lock().await;
        let snapshot = self.current();
        store::write_json(self.store.as_ref(), keys::FAVORITES, &snapshot).await
    }
}
