//! GET /index/stats: point count and dimensions of the live collection.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use product_vectors::VectorIndex;
use serde::Serialize;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
};

#[derive(Debug, Serialize)]
pub struct IndexStatsResponse {
    pub points: u64,
    /// `None` when the collection does not exist yet.
    pub index_dimension: Option<usize>,
    pub vocabulary_size: usize,
    /// Fingerprint of the vocabulary queries are vectorized with.
    pub vocabulary_id: String,
}

pub async fn index_stats_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let service = state.service().await;
    let index = service.index();

    let index_dimension = index.dimension().await?;
    let points = match index_dimension {
        Some(_) => index.count().await?,
        None => 0,
    };

    Ok(ApiResponse::success(IndexStatsResponse {
        points,
        index_dimension,
        vocabulary_size: service.vocabulary().len(),
        vocabulary_id: service.vocabulary().fingerprint(),
    })
    .into_response_with_status(StatusCode::OK))
}
