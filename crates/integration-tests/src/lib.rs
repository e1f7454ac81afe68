//! Integration tests for the catalog browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p catalog-browser-integration-tests
//! ```
//!
//! Tests run the real HTTP client against [`FakeCatalogServer`], a local axum
//! server that serves Fake Store shaped JSON on an ephemeral port. Nothing
//! leaves the machine.
//!
//! # Test Categories
//!
//! - `remote_client` - Decoding and error mapping of the HTTP client
//! - `catalog_sync` - View-models end to end over HTTP
//! - `offline_restart` - Persistence across restarts with the server down

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use catalog_browser::CatalogConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Category labels used by [`sample_products`], as the Fake Store API names
/// them.
pub const SAMPLE_CATEGORIES: [&str; 4] = [
    "electronics",
    "jewelery",
    "men's clothing",
    "women's clothing",
];

// =============================================================================
// Fake Catalog Server
// =============================================================================

/// One JSON endpoint with a switchable failure mode.
#[derive(Debug)]
struct Endpoint {
    body: Mutex<String>,
    failure: Mutex<Option<StatusCode>>,
    hits: AtomicUsize,
}

impl Endpoint {
    fn new(body: &Value) -> Self {
        Self {
            body: Mutex::new(body.to_string()),
            failure: Mutex::new(None),
            hits: AtomicUsize::new(0),
        }
    }

    fn respond(&self) -> Response {
        self.hits.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *lock(&self.failure) {
            return status.into_response();
        }
        let body = lock(&self.body).clone();
        ([(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

#[derive(Debug)]
struct ServerState {
    products: Endpoint,
    categories: Endpoint,
}

/// Local stand-in for the remote catalog API.
///
/// Serves `GET /products` and `GET /products/categories`. The server stops
/// when dropped.
#[derive(Debug)]
pub struct FakeCatalogServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    handle: JoinHandle<()>,
}

impl FakeCatalogServer {
    /// Start serving `products` and `categories` on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(products: &Value, categories: &Value) -> Self {
        let state = Arc::new(ServerState {
            products: Endpoint::new(products),
            categories: Endpoint::new(categories),
        });

        let app = Router::new()
            .route("/products", get(products_handler))
            .route("/products/categories", get(categories_handler))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake catalog server");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake catalog address");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake catalog server stopped");
            }
        });

        tracing::debug!(%addr, "Fake catalog server listening");
        Self {
            addr,
            state,
            handle,
        }
    }

    /// Start with [`sample_products`] and [`SAMPLE_CATEGORIES`].
    pub async fn with_samples(count: u32) -> Self {
        Self::start(&sample_products(count), &json!(SAMPLE_CATEGORIES)).await
    }

    /// Absolute URL of `path` on this server.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not form a valid URL.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).expect("valid fake server URL")
    }

    /// Client configuration pointing at this server.
    ///
    /// Retries are disabled and the timeout is short so failure paths stay
    /// fast.
    #[must_use]
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig {
            products_url: self.url("/products"),
            categories_url: self.url("/products/categories"),
            fetch_retries: 0,
            http_timeout: Duration::from_secs(5),
            ..CatalogConfig::default()
        }
    }

    /// Replace the product payload.
    pub fn set_products(&self, products: &Value) {
        *lock(&self.state.products.body) = products.to_string();
    }

    /// Serve a raw, possibly invalid, product body.
    pub fn set_products_raw(&self, body: &str) {
        *lock(&self.state.products.body) = body.to_string();
    }

    /// Answer product requests with `status`, or normally with `None`.
    pub fn fail_products(&self, status: Option<StatusCode>) {
        *lock(&self.state.products.failure) = status;
    }

    /// Answer category requests with `status`, or normally with `None`.
    pub fn fail_categories(&self, status: Option<StatusCode>) {
        *lock(&self.state.categories.failure) = status;
    }

    /// Answer every request with 503.
    pub fn go_offline(&self) {
        self.fail_products(Some(StatusCode::SERVICE_UNAVAILABLE));
        self.fail_categories(Some(StatusCode::SERVICE_UNAVAILABLE));
    }

    /// Serve normally again.
    pub fn go_online(&self) {
        self.fail_products(None);
        self.fail_categories(None);
    }

    /// Number of product requests received.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.products.hits.load(Ordering::SeqCst)
    }

    /// Number of category requests received.
    #[must_use]
    pub fn category_hits(&self) -> usize {
        self.state.categories.hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeCatalogServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn products_handler(State(state): State<Arc<ServerState>>) -> Response {
    state.products.respond()
}

async fn categories_handler(State(state): State<Arc<ServerState>>) -> Response {
    state.categories.respond()
}

// =============================================================================
// Fixtures
// =============================================================================

/// `count` products shaped like the Fake Store API's, ids starting at 1.
///
/// Prices are `id * 1.5`, so ascending price order equals id order. Categories
/// cycle through [`SAMPLE_CATEGORIES`].
#[must_use]
pub fn sample_products(count: u32) -> Value {
    let products: Vec<Value> = (1..=count)
        .zip(SAMPLE_CATEGORIES.iter().cycle())
        .map(|(id, category)| {
            json!({
                "id": id,
                "title": format!("Sample item {id}"),
                "price": f64::from(id) * 1.5,
                "description": "A sample product.",
                "category": category,
                "image": format!("https://fakestoreapi.com/img/{id}.jpg"),
                "rating": { "rate": 4.1, "count": 120 + id }
            })
        })
        .collect();
    Value::Array(products)
}

/// Install a test-friendly tracing subscriber; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_browser=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
