//! Persistent key-value storage.
//!
//! # Keys
//!
//! The store is shared by the repository and the favorites store through a
//! fixed key namespace; no transaction spans two keys.
//!
//! - [`keys::PRODUCTS_CACHE`] - last fetched product list
//! - [`keys::CATEGORIES_CACHE`] - last fetched category list
//! - [`keys::FAVORITES`] - liked product ids
//!
//! # Backends
//!
//! - [`FileStore`] - one file per key under a directory, survives restarts
//! - [`MemoryStore`] - in-process, for tests and throwaway sessions

mod file;
mod memory;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::error::PersistenceWriteError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Well-known store keys.
pub mod keys {
    /// Last successfully fetched product list.
    pub const PRODUCTS_CACHE: &str = "@products_cache";
    /// Last successfully fetched category list.
    pub const CATEGORIES_CACHE: &str = "@categories_cache";
    /// Liked product ids.
    pub const FAVORITES: &str = "@favorites_ids";
}

/// Errors raised by a key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("key {0:?} cannot be stored")]
    InvalidKey(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable, asynchronous storage of string-keyed byte blobs.
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, `None` if absent.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Read and decode a JSON value.
///
/// Read failures and malformed data are logged and reported as absent.
pub(crate) async fn read_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let bytes = match store.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored value");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Discarding malformed stored value");
            None
        }
    }
}

/// Encode `value` as JSON and write it under `key`.
pub(crate) async fn write_json<S, T>(
    store: &S,
    key: &'static str,
    value: &T,
) -> Result<(), PersistenceWriteError>
where
    S: KeyValueStore,
    T: Serialize + ?Sized,
{
    let bytes =
        serde_json::to_vec(value).map_err(|source| PersistenceWriteError::Encode { key, source })?;
    store
        .set(key, bytes)
        .await
        .map_err(|source| PersistenceWriteError::Store { key, source })
}
