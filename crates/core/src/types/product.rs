//! Catalog product as returned by the remote API.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product in the catalog.
///
/// Products are immutable once fetched; the remote API is the only source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable, unique product ID.
    pub id: ProductId,
    /// Product title (searched case-insensitively).
    pub title: String,
    /// Non-negative price.
    pub price: Price,
    /// Category label, one of an open set.
    pub category: String,
    /// Image URI.
    pub image: String,
    /// Plain text description.
    #[serde(default)]
    pub description: String,
    /// Customer rating, when the API provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating (0-5).
    pub rate: f64,
    /// Number of ratings.
    pub count: u32,
}
