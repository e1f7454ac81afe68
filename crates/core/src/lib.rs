//! Catalog Browser Core - Shared types and the derived query engine.
//!
//! This crate provides the data model used across the catalog browser:
//! - `catalog` - Remote client, local stores, repository and view-models
//! - `integration-tests` - End-to-end tests against a local HTTP server
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows the query
//! engine to be tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product ids, prices, products, categories
//!   and favorite sets
//! - [`query`] - Query state and the filter/sort/paginate projection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod query;
pub mod types;

pub use query::{QueryState, SortDirection, filtered, filtered_count, project};
pub use types::*;
