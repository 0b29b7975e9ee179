//! Product catalog abstraction.

use catalog_client::{CatalogError, CatalogProduct};
use std::{future::Future, pin::Pin};

/// Boxed future returned by [`ProductCatalog`] methods.
pub type CatalogFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'a>>;

/// Source of raw catalog products.
///
/// Implement this trait to plug in another backend; tests use in-memory doubles.
pub trait ProductCatalog: Send + Sync {
    /// Looks up a single product. `Ok(None)` means the catalog does not know the code.
    fn fetch_product<'a>(&'a self, code: &'a str) -> CatalogFuture<'a, Option<CatalogProduct>>;

    /// Fetches one 1-based page of popular products.
    fn fetch_page(&self, page: u32) -> CatalogFuture<'_, Vec<CatalogProduct>>;
}

pub mod open_food_facts;
