//! Read-only view state handed to the presentation layer.

use catalog_browser_core::{FavoriteSet, Product, QueryState};
use thiserror::Error;

use crate::api::ResourceKind;
use crate::repository::RepositoryError;

/// Whether more filtered products remain past the visible page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    /// Everything that matches is visible.
    Idle,
    /// `load_more` would reveal more products.
    CanLoadMore,
}

impl PaginationState {
    #[must_use]
    pub const fn from_counts(visible: usize, filtered: usize) -> Self {
        if visible < filtered {
            Self::CanLoadMore
        } else {
            Self::Idle
        }
    }
}

/// Commands the view-model asks the presentation layer to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    /// Scroll the product list back to the first item.
    ScrollToTop,
}

/// A failed load as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not load {resource}: {reason}")]
pub struct LoadError {
    pub resource: ResourceKind,
    /// Underlying network failure, for display or diagnostics.
    pub reason: String,
}

impl From<&RepositoryError> for LoadError {
    fn from(err: &RepositoryError) -> Self {
        match err {
            RepositoryError::DataUnavailable { resource, source } => Self {
                resource: *resource,
                reason: source.to_string(),
            },
        }
    }
}

/// Everything the catalog screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    /// The visible page, already filtered, sorted and truncated.
    pub items: Vec<Product>,
    /// Number of products matching the filters.
    pub filtered_count: usize,
    pub pagination: PaginationState,
    /// `"All"` followed by the known categories.
    pub category_options: Vec<String>,
    pub query: QueryState,
    pub favorites: FavoriteSet,
    /// Initial load in progress with nothing to show yet.
    pub loading: bool,
    /// A user-triggered refresh is in progress over existing data.
    pub refreshing: bool,
    /// Load failure with nothing to show; the screen offers a retry.
    pub error: Option<LoadError>,
    /// The products shown may be older than the remote catalog.
    pub stale: bool,
}

impl CatalogSnapshot {
    /// Whether `product` should render as liked.
    #[must_use]
    pub fn is_favorite(&self, product: &Product) -> bool {
        self.favorites.contains(product.id)
    }

    /// Whether the retry affordance should be shown.
    #[must_use]
    pub const fn can_retry(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything the liked-products screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LikedSnapshot {
    /// Liked products in catalog order.
    pub items: Vec<Product>,
    pub favorites: FavoriteSet,
    pub refreshing: bool,
}

impl LikedSnapshot {
    /// Whether the "no liked products yet" state should be shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
