//! Open Food Facts HTTP client.
//!
//! Endpoints used:
//!   * GET /cgi/search.pl?action=process&json=1&page={n}   (paged search)
//!   * GET /api/v2/product/{code}.json                       (single product)

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, trace, warn};

use crate::errors::{CatalogError, CatalogResult};
use crate::types::{CatalogProduct, ProductResponse, SearchResponse};

/// Fields requested from the search endpoint.
const SEARCH_FIELDS: &str = "code,product_name,ecoscore_extended_data,image_front_url";
/// Fields requested from the product endpoint (`code` is always top-level there).
const PRODUCT_FIELDS: &str = "product_name,ecoscore_extended_data,image_front_url";

/// Runtime configuration for [`OpenFoodFactsClient`].
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// API base, e.g. "https://world.openfoodfacts.org".
    pub base_url: String,
    /// Products per search page (the API caps this at 1000).
    pub page_size: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// User agent; Open Food Facts asks integrations to identify themselves.
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org".to_string(),
            page_size: 1000,
            timeout_secs: 30,
            user_agent: "food-similarity/0.1".to_string(),
        }
    }
}

/// Thin async client over the Open Food Facts search and product APIs.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    http: Client,
    base_url: String,
    page_size: u32,
}

impl OpenFoodFactsClient {
    /// Builds a client with a shared HTTP instance.
    ///
    /// # Errors
    /// - [`CatalogError::InvalidBaseUrl`] if `base_url` is empty or not http(s)
    /// - [`CatalogError::Network`] if the HTTP client cannot be built
    pub fn from_config(cfg: CatalogConfig) -> CatalogResult<Self> {
        let base_url = cfg.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty()
            || !(base_url.starts_with("http://") || base_url.starts_with("https://"))
        {
            return Err(CatalogError::InvalidBaseUrl(cfg.base_url));
        }

        debug!(
            "Initializing catalog client: base_url={}, page_size={}",
            base_url, cfg.page_size
        );

        let http = Client::builder()
            .user_agent(cfg.user_agent)
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            http,
            base_url,
            page_size: cfg.page_size.max(1),
        })
    }

    /// Fetches one page of products sorted by scan count (most scanned first).
    ///
    /// Pages start from 1.
    pub async fn search_page(&self, page: u32) -> CatalogResult<Vec<CatalogProduct>> {
        if page == 0 {
            return Err(CatalogError::InvalidPage(page));
        }

        let url = format!("{}/cgi/search.pl", self.base_url);
        let page_size = self.page_size.to_string();
        let page_no = page.to_string();
        debug!("Catalog search_page: {} page={}", url, page);

        let resp: SearchResponse = self
            .http
            .get(&url)
            .query(&[
                ("sort_by", "unique_scans_n"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
                ("page", page_no.as_str()),
                ("fields", SEARCH_FIELDS),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let total = resp.products.len();
        let products: Vec<CatalogProduct> = resp
            .products
            .into_iter()
            .enumerate()
            .filter_map(|(i, raw)| match serde_json::from_value(raw) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Catalog search_page: page={} item={} skipped: {}", page, i, e);
                    None
                }
            })
            .collect();

        trace!(
            "Catalog search_page: page={} products={}/{}",
            page,
            products.len(),
            total
        );
        Ok(products)
    }

    /// Looks up a single product by barcode.
    ///
    /// Returns `Ok(None)` when the catalog does not know the code (HTTP 404 or
    /// `status: 0`). The returned product carries the response's top-level
    /// `code` as its identity.
    pub async fn product(&self, code: &str) -> CatalogResult<Option<CatalogProduct>> {
        validate_code(code)?;

        let url = format!("{}/api/v2/product/{}.json", self.base_url, code);
        debug!("Catalog product: {}", url);

        let resp = self
            .http
            .get(&url)
            .query(&[("fields", PRODUCT_FIELDS)])
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!("Catalog product: code={} not found", code);
            return Ok(None);
        }

        let body: ProductResponse = resp.error_for_status()?.json().await?;
        if body.status == Some(0) {
            debug!("Catalog product: code={} reported missing", code);
            return Ok(None);
        }

        Ok(body.product.map(|mut product| {
            if body.code.is_some() {
                product.code = body.code;
            }
            product
        }))
    }
}

/// Checks that `code` looks like a barcode (non-empty, ASCII digits only).
pub fn validate_code(code: &str) -> CatalogResult<()> {
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CatalogError::InvalidCode(code.to_string()));
    }
    Ok(())
}
