//! Core types for the catalog browser.
//!
//! This module provides type-safe wrappers for the catalog domain.

pub mod category;
pub mod favorites;
pub mod id;
pub mod price;
pub mod product;

pub use category::{ALL_CATEGORIES, CategoryList};
pub use favorites::FavoriteSet;
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, Rating};
