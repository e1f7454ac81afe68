//! Integration tests for the view-models over HTTP.
//!
//! These tests drive the catalog and liked view-models through the real
//! client against a local fake catalog.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use catalog_browser::CatalogServices;
use catalog_browser::view_model::{CatalogSnapshot, PaginationState};
use catalog_browser_core::{ALL_CATEGORIES, ProductId};
use catalog_browser_integration_tests::{
    FakeCatalogServer, SAMPLE_CATEGORIES, init_tracing, sample_products,
};

fn ids(snapshot: &CatalogSnapshot) -> Vec<i64> {
    snapshot.items.iter().map(|p| p.id.as_i64()).collect()
}

// =============================================================================
// Browsing
// =============================================================================

#[tokio::test]
async fn test_pages_through_remote_catalog() {
    init_tracing();
    let server = FakeCatalogServer::with_samples(25).await;
    let services = CatalogServices::in_memory(server.config()).unwrap();
    let view = services.catalog_view();

    view.resume().await;
    let snapshot = view.snapshot();
    assert_eq!(ids(&snapshot), (1..=10).collect::<Vec<_>>());
    assert_eq!(snapshot.pagination, PaginationState::CanLoadMore);
    assert_eq!(snapshot.category_options[0], ALL_CATEGORIES);
    assert_eq!(&snapshot.category_options[1..], SAMPLE_CATEGORIES);

    assert!(view.load_more());
    assert!(view.load_more());
    let snapshot = view.snapshot();
    assert_eq!(snapshot.items.len(), 25);
    assert_eq!(snapshot.pagination, PaginationState::Idle);
    assert!(!view.load_more());
}

#[tokio::test]
async fn test_search_category_and_sort() {
    init_tracing();
    let server = FakeCatalogServer::with_samples(12).await;
    let services = CatalogServices::in_memory(server.config()).unwrap();
    let view = services.catalog_view();
    view.resume().await;

    view.set_category("jewelery");
    assert_eq!(ids(&view.snapshot()), [2, 6, 10]);

    view.toggle_sort_direction();
    assert_eq!(ids(&view.snapshot()), [10, 6, 2]);

    view.set_search_text("  ITEM 1");
    assert_eq!(ids(&view.snapshot()), [10]);
}

#[tokio::test]
async fn test_resume_within_window_skips_network() {
    init_tracing();
    let server = FakeCatalogServer::with_samples(5).await;
    let services = CatalogServices::in_memory(server.config()).unwrap();

    services.catalog_view().resume().await;
    // A second screen shares the repository and its freshness window
    services.catalog_view().resume().await;

    assert_eq!(server.product_hits(), 1);
    assert_eq!(server.category_hits(), 1);
}

#[tokio::test]
async fn test_refresh_picks_up_remote_changes() {
    init_tracing();
    let server = FakeCatalogServer::with_samples(5).await;
    let services = CatalogServices::in_memory(server.config()).unwrap();
    let view = services.catalog_view();
    view.resume().await;
    assert_eq!(view.snapshot().items.len(), 5);

    server.set_products(&sample_products(2));
    view.refresh().await;

    let snapshot = view.snapshot();
    assert_eq!(ids(&snapshot), [1, 2]);
    assert!(!snapshot.refreshing);
    assert!(!snapshot.stale);
    assert_eq!(server.product_hits(), 2);
}

// =============================================================================
// Failure and Recovery
// =============================================================================

#[tokio::test]
async fn test_first_launch_offline_then_retry() {
    init_tracing();
    let server = FakeCatalogServer::with_samples(5).await;
    server.go_offline();
    let services = CatalogServices::in_memory(server.config()).unwrap();
    let view = services.catalog_view();

    view.resume().await;
    let snapshot = view.snapshot();
    assert!(snapshot.can_retry());
    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.category_options, [ALL_CATEGORIES]);

    server.go_online();
    view.retry().await;
    let snapshot = view.snapshot();
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.items.len(), 5);
    assert_eq!(snapshot.category_options.len(), 1 + SAMPLE_CATEGORIES.len());
}

#[tokio::test]
async fn test_server_outage_keeps_showing_products() {
    init_tracing();
    let server = FakeCatalogServer::with_samples(5).await;
    let services = CatalogServices::in_memory(server.config()).unwrap();
    let view = services.catalog_view();
    view.resume().await;

    server.go_offline();
    view.refresh().await;

    let snapshot = view.snapshot();
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.items.len(), 5);
    assert!(snapshot.stale);
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_liked_view_follows_catalog_likes() {
    init_tracing();
    let server = FakeCatalogServer::with_samples(8).await;
    let services = CatalogServices::in_memory(server.config()).unwrap();
    let catalog = services.catalog_view();
    let liked = services.liked_view();
    catalog.resume().await;

    catalog.toggle_favorite(ProductId::new(7)).await;
    catalog.toggle_favorite(ProductId::new(3)).await;
    liked.resume().await;
    let items: Vec<i64> = liked.snapshot().items.iter().map(|p| p.id.as_i64()).collect();
    assert_eq!(items, [3, 7]);

    liked.toggle_favorite(ProductId::new(3)).await;
    catalog.resume().await;
    let snapshot = catalog.snapshot();
    assert!(!snapshot.favorites.contains(ProductId::new(3)));
    assert!(snapshot.favorites.contains(ProductId::new(7)));
}
