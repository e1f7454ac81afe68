//! Set of liked product IDs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Product IDs the user has liked.
///
/// Membership does not depend on the product still being in the catalog.
/// Serialized as a JSON array of integers; order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(HashSet<ProductId>);

impl FavoriteSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.0.contains(&id)
    }

    /// Flip membership of `id`. Returns `true` if the id is now liked.
    pub fn toggle(&mut self, id: ProductId) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ProductId> for FavoriteSet {
    fn from_iter<T: IntoIterator<Item = ProductId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores() {
        let original: FavoriteSet = [ProductId::new(1), ProductId::new(3)].into_iter().collect();
        let mut set = original.clone();

        assert!(set.toggle(ProductId::new(2)));
        assert!(set.contains(ProductId::new(2)));
        assert!(!set.toggle(ProductId::new(2)));
        assert_eq!(set, original);
    }

    #[test]
    fn test_json_array_roundtrip() {
        let set: FavoriteSet = serde_json::from_str("[4, 1, 4]").unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(ProductId::new(4)));

        let json = serde_json::to_string(&set).unwrap();
        let again: FavoriteSet = serde_json::from_str(&json).unwrap();
        assert_eq!(again, set);
    }
}
