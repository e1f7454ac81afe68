//! Catalog Browser - offline-first catalog sync, favorites and view-models.
//!
//! This crate holds everything between the remote catalog and the screens:
//!
//! - [`api`] - Remote catalog client (products and categories over HTTP)
//! - [`store`] - Byte-level key-value persistence (file-backed and in-memory)
//! - [`repository`] - Network-first loads with write-through caching and
//!   cache fallback
//! - [`favorites`] - Persisted set of liked product ids
//! - [`view_model`] - Catalog and liked-products view-models
//! - [`state`] - Wiring of the above into shareable services
//!
//! Pure types and the filter/sort/paginate projection live in
//! `catalog-browser-core`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod api;
pub mod config;
pub mod error;
pub mod favorites;
pub mod repository;
pub mod state;
pub mod store;
pub mod view_model;

#[cfg(test)]
mod testing;

pub use config::CatalogConfig;
pub use error::CatalogError;
pub use state::CatalogServices;

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Guarded state is always left consistent between statements, so a poisoned
/// lock carries nothing worse than the last completed update.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
