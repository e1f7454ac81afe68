//! HTTP client for the catalog API.

use std::sync::Arc;

use catalog_browser_core::{CategoryList, Product};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogSource, NetworkError, ResourceKind};
use crate::config::CatalogConfig;

// =============================================================================
// RemoteCatalogClient
// =============================================================================

/// Client for the remote catalog API.
///
/// Stateless apart from the connection pool; cheap to clone.
#[derive(Clone)]
pub struct RemoteCatalogClient {
    inner: Arc<RemoteCatalogClientInner>,
}

struct RemoteCatalogClientInner {
    client: reqwest::Client,
    products_url: Url,
    categories_url: Url,
}

impl RemoteCatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RemoteCatalogClientInner {
                client,
                products_url: config.products_url.clone(),
                categories_url: config.categories_url.clone(),
            }),
        })
    }

    /// GET a JSON document.
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: ResourceKind,
        url: &Url,
    ) -> Result<T, NetworkError> {
        let transport = |source| NetworkError::Transport { resource, source };

        let response = self
            .inner
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            tracing::error!(
                resource = %resource,
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(NetworkError::Status {
                resource,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&response_text).map_err(|source| {
            tracing::error!(
                resource = %resource,
                error = %source,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            NetworkError::Decode { resource, source }
        })
    }
}

impl CatalogSource for RemoteCatalogClient {
    #[instrument(skip(self), fields(url = %self.inner.products_url))]
    async fn fetch_products(&self) -> Result<Vec<Product>, NetworkError> {
        let products: Vec<Product> = self
            .get_json(ResourceKind::Products, &self.inner.products_url)
            .await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self), fields(url = %self.inner.categories_url))]
    async fn fetch_categories(&self) -> Result<CategoryList, NetworkError> {
        let categories: CategoryList = self
            .get_json(ResourceKind::Categories, &self.inner.categories_url)
            .await?;
        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }
}
