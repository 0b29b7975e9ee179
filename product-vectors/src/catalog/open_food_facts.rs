use catalog_client::{CatalogProduct, OpenFoodFactsClient};

use super::{CatalogFuture, ProductCatalog};

impl ProductCatalog for OpenFoodFactsClient {
    fn fetch_product<'a>(&'a self, code: &'a str) -> CatalogFuture<'a, Option<CatalogProduct>> {
        Box::pin(self.product(code))
    }

    fn fetch_page(&self, page: u32) -> CatalogFuture<'_, Vec<CatalogProduct>> {
        Box::pin(self.search_page(page))
    }
}
