//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults point at the public Fake Store API.
//!
//! - `CATALOG_PRODUCTS_URL` - Product collection endpoint
//!   (default: `https://fakestoreapi.com/products`)
//! - `CATALOG_CATEGORIES_URL` - Category collection endpoint
//!   (default: `https://fakestoreapi.com/products/categories`)
//! - `CATALOG_PAGE_SIZE` - Products added per "load more" (default: 10)
//! - `CATALOG_PRODUCTS_STALE_SECS` - How long fetched products count as
//!   fresh (default: 300)
//! - `CATALOG_CATEGORIES_STALE_SECS` - How long fetched categories count as
//!   fresh (default: 3600)
//! - `CATALOG_FETCH_RETRIES` - Extra attempts before a load is reported as
//!   failed (default: 1)
//! - `CATALOG_HTTP_TIMEOUT_SECS` - HTTP request timeout (default: 30)
//! - `CATALOG_STORE_DIR` - Directory for the file-backed store

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_PRODUCTS_URL: &str = "https://fakestoreapi.com/products";
const DEFAULT_CATEGORIES_URL: &str = "https://fakestoreapi.com/products/categories";
const DEFAULT_PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(10).expect("non-zero literal");
const DEFAULT_PRODUCTS_STALE: Duration = Duration::from_secs(5 * 60);
const DEFAULT_CATEGORIES_STALE: Duration = Duration::from_secs(60 * 60);
const DEFAULT_FETCH_RETRIES: u32 = 1;
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Product collection endpoint
    pub products_url: Url,
    /// Category collection endpoint
    pub categories_url: Url,
    /// Number of products shown per page
    pub page_size: NonZeroUsize,
    /// Freshness window for products fetched from the network
    pub products_stale_after: Duration,
    /// Freshness window for categories fetched from the network
    pub categories_stale_after: Duration,
    /// Extra repository attempts before surfacing a load failure
    pub fetch_retries: u32,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Root directory of the file-backed key-value store
    pub store_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_url: default_url(DEFAULT_PRODUCTS_URL),
            categories_url: default_url(DEFAULT_CATEGORIES_URL),
            page_size: DEFAULT_PAGE_SIZE,
            products_stale_after: DEFAULT_PRODUCTS_STALE,
            categories_stale_after: DEFAULT_CATEGORIES_STALE,
            fetch_retries: DEFAULT_FETCH_RETRIES,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            store_dir: None,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let products_url = parse_or(&lookup, "CATALOG_PRODUCTS_URL", defaults.products_url)?;
        let categories_url =
            parse_or(&lookup, "CATALOG_CATEGORIES_URL", defaults.categories_url)?;
        let page_size = parse_or(&lookup, "CATALOG_PAGE_SIZE", defaults.page_size)?;
        let products_stale_after = secs_or(
            &lookup,
            "CATALOG_PRODUCTS_STALE_SECS",
            defaults.products_stale_after,
        )?;
        let categories_stale_after = secs_or(
            &lookup,
            "CATALOG_CATEGORIES_STALE_SECS",
            defaults.categories_stale_after,
        )?;
        let fetch_retries = parse_or(&lookup, "CATALOG_FETCH_RETRIES", defaults.fetch_retries)?;
        let http_timeout = secs_or(&lookup, "CATALOG_HTTP_TIMEOUT_SECS", defaults.http_timeout)?;
        let store_dir = lookup("CATALOG_STORE_DIR").map(PathBuf::from);

        Ok(Self {
            products_url,
            categories_url,
            page_size,
            products_stale_after,
            categories_stale_after,
            fetch_retries,
            http_timeout,
            store_dir,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("default URL is valid")
}

/// Parse a variable if set, otherwise fall back to `default`.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse a whole number of seconds if set, otherwise fall back to `default`.
fn secs_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default.as_secs()).map(Duration::from_secs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = CatalogConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.products_url.as_str(), DEFAULT_PRODUCTS_URL);
        assert_eq!(config.categories_url.as_str(), DEFAULT_CATEGORIES_URL);
        assert_eq!(config.page_size.get(), 10);
        assert_eq!(config.products_stale_after, Duration::from_secs(300));
        assert_eq!(config.categories_stale_after, Duration::from_secs(3600));
        assert_eq!(config.fetch_retries, 1);
        assert!(config.store_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = CatalogConfig::from_lookup(lookup_from(&[
            ("CATALOG_PRODUCTS_URL", "http://127.0.0.1:8080/products"),
            ("CATALOG_PAGE_SIZE", " 4 "),
            ("CATALOG_FETCH_RETRIES", "0"),
            ("CATALOG_PRODUCTS_STALE_SECS", "0"),
            ("CATALOG_STORE_DIR", "/tmp/catalog"),
        ]))
        .unwrap();

        assert_eq!(config.products_url.port(), Some(8080));
        assert_eq!(config.page_size.get(), 4);
        assert_eq!(config.fetch_retries, 0);
        assert_eq!(config.products_stale_after, Duration::ZERO);
        assert_eq!(config.store_dir, Some(PathBuf::from("/tmp/catalog")));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = CatalogConfig::from_lookup(lookup_from(&[("CATALOG_PAGE_SIZE", "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "CATALOG_PAGE_SIZE"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result =
            CatalogConfig::from_lookup(lookup_from(&[("CATALOG_CATEGORIES_URL", "not a url")]));
        assert!(result.is_err());
    }
}
