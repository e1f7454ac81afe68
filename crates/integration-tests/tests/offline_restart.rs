//! Integration tests for persistence across restarts.
//!
//! Each test opens file-backed services in a temporary directory, loads while
//! the fake catalog is online, then reopens the same directory with the
//! catalog offline.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use catalog_browser::CatalogServices;
use catalog_browser::store::{FileStore, KeyValueStore, keys};
use catalog_browser_core::{ALL_CATEGORIES, ProductId};
use catalog_browser_integration_tests::{FakeCatalogServer, SAMPLE_CATEGORIES, init_tracing};
use tempfile::TempDir;

async fn open(
    server: &FakeCatalogServer,
    dir: &TempDir,
) -> CatalogServices<FileStore, catalog_browser::api::RemoteCatalogClient> {
    let mut config = server.config();
    config.store_dir = Some(dir.path().to_path_buf());
    CatalogServices::open(config).await.unwrap()
}

#[tokio::test]
async fn test_restart_offline_serves_cached_catalog_and_favorites() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let server = FakeCatalogServer::with_samples(15).await;

    {
        let services = open(&server, &dir).await;
        let view = services.catalog_view();
        view.resume().await;
        view.toggle_favorite(ProductId::new(3)).await;
    }

    server.go_offline();
    let services = open(&server, &dir).await;
    let view = services.catalog_view();
    view.resume().await;

    let snapshot = view.snapshot();
    assert!(snapshot.error.is_none());
    assert!(snapshot.stale);
    assert_eq!(snapshot.items.len(), 10);
    assert_eq!(snapshot.filtered_count, 15);
    assert!(snapshot.favorites.contains(ProductId::new(3)));
    assert_eq!(snapshot.category_options.len(), 1 + SAMPLE_CATEGORIES.len());

    let liked = services.liked_view();
    liked.resume().await;
    let items = liked.snapshot().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ProductId::new(3));
}

#[tokio::test]
async fn test_categories_derived_when_never_fetched() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let server = FakeCatalogServer::with_samples(6).await;
    server.fail_categories(Some(StatusCode::BAD_GATEWAY));

    {
        let services = open(&server, &dir).await;
        services.catalog_view().resume().await;
    }

    server.go_offline();
    let services = open(&server, &dir).await;
    let view = services.catalog_view();
    view.resume().await;

    let options = view.snapshot().category_options;
    assert_eq!(options[0], ALL_CATEGORIES);
    assert_eq!(&options[1..], SAMPLE_CATEGORIES);
}

#[tokio::test]
async fn test_clear_cache_keeps_favorites() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let server = FakeCatalogServer::with_samples(4).await;
    let services = open(&server, &dir).await;
    let view = services.catalog_view();
    view.resume().await;
    view.toggle_favorite(ProductId::new(2)).await;

    services.repository().clear_cache().await.unwrap();

    let store = FileStore::open(dir.path()).await.unwrap();
    assert!(store.get(keys::PRODUCTS_CACHE).await.unwrap().is_none());
    assert!(store.get(keys::CATEGORIES_CACHE).await.unwrap().is_none());
    assert!(store.get(keys::FAVORITES).await.unwrap().is_some());

    // Nothing cached and nothing reachable: the view has to offer a retry
    server.go_offline();
    let fresh = services.catalog_view();
    fresh.resume().await;
    let snapshot = fresh.snapshot();
    assert!(snapshot.can_retry());
    assert!(snapshot.favorites.contains(ProductId::new(2)));
}

#[tokio::test]
async fn test_corrupt_cache_reads_as_missing() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let server = FakeCatalogServer::with_samples(4).await;

    let store = FileStore::open(dir.path()).await.unwrap();
    store
        .set(keys::PRODUCTS_CACHE, b"{ truncated".to_vec())
        .await
        .unwrap();
    store.set(keys::FAVORITES, b"[1, 2".to_vec()).await.unwrap();

    server.go_offline();
    let services = open(&server, &dir).await;
    let view = services.catalog_view();
    view.resume().await;

    let snapshot = view.snapshot();
    assert!(snapshot.can_retry());
    assert!(snapshot.favorites.is_empty());
}
