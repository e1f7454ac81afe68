//! Ordered set of distinct category labels.

use serde::{Deserialize, Serialize};

use super::product::Product;

/// Wildcard category option shown ahead of the real labels.
///
/// Never part of a [`CategoryList`]; the view layer prepends it.
pub const ALL_CATEGORIES: &str = "All";

/// Distinct category labels in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CategoryList(Vec<String>);

impl CategoryList {
    /// Build a list from labels, dropping duplicates while keeping the first
    /// occurrence of each.
    #[must_use]
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !out.contains(&label) {
                out.push(label);
            }
        }
        Self(out)
    }

    /// Infer the categories present in a product list.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        Self::new(products.iter().map(|p| p.category.as_str()))
    }

    /// Category options for a picker: the wildcard followed by every label.
    #[must_use]
    pub fn options(&self) -> Vec<String> {
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.0.iter().cloned())
            .collect()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for CategoryList {
    fn from(labels: Vec<String>) -> Self {
        Self::new(labels)
    }
}

impl From<CategoryList> for Vec<String> {
    fn from(list: CategoryList) -> Self {
        list.0
    }
}
