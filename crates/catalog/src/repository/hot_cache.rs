//! In-process cache of recent network results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use catalog_browser_core::{CategoryList, Product};
use moka::Expiry;
use moka::future::Cache;

/// Cache key for recently fetched resources.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Categories(CategoryList),
}

/// Per-resource freshness windows.
#[derive(Debug, Clone, Copy)]
struct FreshnessWindows {
    products: Duration,
    categories: Duration,
}

impl Expiry<CacheKey, CacheValue> for FreshnessWindows {
    fn expire_after_create(
        &self,
        key: &CacheKey,
        _value: &CacheValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(match key {
            CacheKey::Products => self.products,
            CacheKey::Categories => self.categories,
        })
    }
}

/// Recent network results, each kept for its resource's freshness window.
#[derive(Clone)]
pub struct HotCache {
    entries: Cache<CacheKey, CacheValue>,
}

impl HotCache {
    pub fn new(products: Duration, categories: Duration) -> Self {
        let entries = Cache::builder()
            .expire_after(FreshnessWindows {
                products,
                categories,
            })
            .build();
        Self { entries }
    }

    pub async fn products(&self) -> Option<Vec<Product>> {
        match self.entries.get(&CacheKey::Products).await {
            Some(CacheValue::Products(products)) => Some(products.as_ref().clone()),
            _ => None,
        }
    }

    pub async fn categories(&self) -> Option<CategoryList> {
        match self.entries.get(&CacheKey::Categories).await {
            Some(CacheValue::Categories(categories)) => Some(categories),
            _ => None,
        }
    }

    pub async fn insert_products(&self, products: Vec<Product>) {
        self.entries
            .insert(CacheKey::Products, CacheValue::Products(Arc::new(products)))
            .await;
    }

    pub async fn insert_categories(&self, categories: CategoryList) {
        self.entries
            .insert(CacheKey::Categories, CacheValue::Categories(categories))
            .await;
    }

    pub async fn clear(&self) {
        self.entries.invalidate(&CacheKey::Products).await;
        self.entries.invalidate(&CacheKey::Categories).await;
    }
}
