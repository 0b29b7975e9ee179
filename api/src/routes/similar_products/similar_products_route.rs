//! GET /products/{code}/similar: nearest products by recipe categories.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use catalog_client::validate_code;
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::similar_products::similar_products_response::SimilarProductsResponse,
};

/// Handler: GET /products/{code}/similar
///
/// # Example
/// ```bash
/// curl http://127.0.0.1:3000/products/3017620422003/similar
/// ```
pub async fn similar_products_route(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let request_id = headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");
    debug!(request_id = %request_id, code = %code, "similar_products_route: start");

    validate_code(&code).map_err(|e| AppError::InvalidProductCode(e.to_string()))?;

    let results = state.service().await.find_similar(&code).await?;
    debug!(
        request_id = %request_id,
        hits = results.len(),
        "similar_products_route: success"
    );

    Ok(ApiResponse::success(SimilarProductsResponse { code, results })
        .into_response_with_status(StatusCode::OK))
}
