//! Query state and the derived projection of a product list.
//!
//! [`project`] is the single place that turns the full product list into the
//! page a user sees. It is a pure function of its inputs: filter by category,
//! filter by title search, sort by price, then truncate to the page cursor.

use serde::{Deserialize, Serialize};

use crate::types::{ALL_CATEGORIES, Product};

/// Price ordering of the projected list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// User-controlled query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    /// Free text matched case-insensitively against product titles.
    pub search_text: String,
    /// A category label, or [`ALL_CATEGORIES`].
    pub selected_category: String,
    /// Price ordering.
    pub sort_direction: SortDirection,
    /// Number of entries to show (the pagination cursor).
    pub visible_count: usize,
}

impl QueryState {
    /// A fresh query showing one page of everything, cheapest first.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            search_text: String::new(),
            selected_category: ALL_CATEGORIES.to_string(),
            sort_direction: SortDirection::Ascending,
            visible_count: page_size,
        }
    }

    /// Whether `product` passes the category and search filters.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = self.selected_category == ALL_CATEGORIES
            || product.category == self.selected_category;
        if !category_ok {
            return false;
        }

        let needle = self.search_text.trim().to_lowercase();
        needle.is_empty() || product.title.to_lowercase().contains(&needle)
    }
}

/// Filter and sort `products` without truncating.
///
/// The sort is stable: products with equal prices keep their input order.
#[must_use]
pub fn filtered(products: &[Product], query: &QueryState) -> Vec<Product> {
    let mut list: Vec<Product> = products
        .iter()
        .filter(|p| query.matches(p))
        .cloned()
        .collect();

    match query.sort_direction {
        SortDirection::Ascending => list.sort_by(|a, b| a.price.cmp(&b.price)),
        SortDirection::Descending => list.sort_by(|a, b| b.price.cmp(&a.price)),
    }
    list
}

/// Number of products passing the filters.
#[must_use]
pub fn filtered_count(products: &[Product], query: &QueryState) -> usize {
    products.iter().filter(|p| query.matches(p)).count()
}

/// Filter, sort and truncate `products` to the visible page.
#[must_use]
pub fn project(products: &[Product], query: &QueryState) -> Vec<Product> {
    let mut list = filtered(products, query);
    list.truncate(query.visible_count);
    list
}
