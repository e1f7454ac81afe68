//! Test doubles shared by the unit tests of this crate.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use catalog_browser_core::{CategoryList, Price, Product, ProductId};
use tokio::sync::oneshot;
use tokio::task;

use crate::api::{CatalogSource, NetworkError, ResourceKind};
use crate::lock;
use crate::store::{KeyValueStore, MemoryStore, StoreError};

/// Build a product with a generated title and image.
pub fn product(id: i64, cents: i64, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Price::from_cents(cents).unwrap(),
        category: category.to_string(),
        image: format!("https://img.example/{id}.png"),
        description: String::new(),
        rating: None,
    }
}

/// One scripted response, optionally held back until released.
struct Step<T> {
    result: Result<T, u16>,
    gate: Option<oneshot::Receiver<()>>,
}

/// A catalog source replaying queued responses.
///
/// An empty queue answers with HTTP 503.
#[derive(Default)]
pub struct ScriptedSource {
    products: Mutex<VecDeque<Step<Vec<Product>>>>,
    categories: Mutex<VecDeque<Step<CategoryList>>>,
    product_calls: AtomicUsize,
    category_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a product response; `Err(status)` fails with that HTTP status.
    pub fn push_products(&self, result: Result<Vec<Product>, u16>) {
        lock(&self.products).push_back(Step { result, gate: None });
    }

    /// Queue a product response that waits until the returned sender fires.
    pub fn push_products_gated(&self, result: Result<Vec<Product>, u16>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        lock(&self.products).push_back(Step {
            result,
            gate: Some(rx),
        });
        tx
    }

    pub fn push_categories(&self, result: Result<CategoryList, u16>) {
        lock(&self.categories).push_back(Step { result, gate: None });
    }

    /// Queue a category response that waits until the returned sender fires.
    pub fn push_categories_gated(
        &self,
        result: Result<CategoryList, u16>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        lock(&self.categories).push_back(Step {
            result,
            gate: Some(rx),
        });
        tx
    }

    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    pub fn category_calls(&self) -> usize {
        self.category_calls.load(Ordering::SeqCst)
    }

    async fn play<T>(resource: ResourceKind, step: Option<Step<T>>) -> Result<T, NetworkError> {
        let Some(step) = step else {
            return Err(NetworkError::Status {
                resource,
                status: 503,
            });
        };
        if let Some(gate) = step.gate {
            let _ = gate.await;
        }
        step.result
            .map_err(|status| NetworkError::Status { resource, status })
    }
}

impl CatalogSource for ScriptedSource {
    async fn fetch_products(&self) -> Result<Vec<Product>, NetworkError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        let step = lock(&self.products).pop_front();
        Self::play(ResourceKind::Products, step).await
    }

    async fn fetch_categories(&self) -> Result<CategoryList, NetworkError> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        let step = lock(&self.categories).pop_front();
        Self::play(ResourceKind::Categories, step).await
    }
}

/// A memory store whose reads and writes can be made to fail or lag.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    write_yields: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every `set` yield to the scheduler `yields` times before writing.
    pub fn slow_writes(&self, yields: usize) {
        self.write_yields.store(yields, Ordering::SeqCst);
    }

    pub const fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        for _ in 0..self.write_yields.load(Ordering::SeqCst) {
            task::yield_now().await;
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        self.inner.remove(key).await
    }
}
