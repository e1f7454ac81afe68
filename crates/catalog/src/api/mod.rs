//! Remote catalog API.
//!
//! # Architecture
//!
//! - [`CatalogSource`] is the seam the repository fetches through
//! - [`RemoteCatalogClient`] implements it with plain `reqwest` GETs
//! - No retries and no caching here; both belong to the callers
//!
//! # Endpoints
//!
//! - Product collection: JSON array of products
//! - Category collection: JSON array of category labels

mod client;

use std::fmt;
use std::future::Future;

use catalog_browser_core::{CategoryList, Product};
use thiserror::Error;

pub use client::RemoteCatalogClient;

/// The kinds of resource the catalog core loads and tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Products,
    Categories,
    Favorites,
}

impl ResourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Favorites => "favorites",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when fetching from the catalog API.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The request never produced a response.
    #[error("HTTP error fetching {resource}: {source}")]
    Transport {
        resource: ResourceKind,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status.
    #[error("{resource} endpoint returned HTTP {status}")]
    Status { resource: ResourceKind, status: u16 },

    /// The body was not the expected JSON array.
    #[error("failed to decode {resource} response: {source}")]
    Decode {
        resource: ResourceKind,
        #[source]
        source: serde_json::Error,
    },
}

impl NetworkError {
    /// The resource whose fetch failed.
    #[must_use]
    pub const fn resource(&self) -> ResourceKind {
        match self {
            Self::Transport { resource, .. }
            | Self::Status { resource, .. }
            | Self::Decode { resource, .. } => *resource,
        }
    }
}

/// A read-only source of catalog data.
pub trait CatalogSource: Send + Sync {
    /// Fetch the full product collection.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, NetworkError>> + Send;

    /// Fetch the category collection.
    fn fetch_categories(&self)
    -> impl Future<Output = Result<CategoryList, NetworkError>> + Send;
}
