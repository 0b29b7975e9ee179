use product_vectors::SimilarProduct;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SimilarProductsResponse {
    /// Barcode the neighbours were computed for.
    pub code: String,
    pub results: Vec<SimilarProduct>,
}
