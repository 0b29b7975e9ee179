//! Open Food Facts catalog client.
//!
//! Fetches raw product records (barcode, name, front image and the
//! `likeliest_recipe` category weights) either page by page or by barcode.

mod client;
mod errors;
mod types;

pub use client::{CatalogConfig, OpenFoodFactsClient, validate_code};
pub use errors::{CatalogError, CatalogResult};
pub use types::{CatalogProduct, CategoryWeights, EcoscoreExtendedData, EcoscoreImpact};
