//! POST /index/migrate: loads the latest dataset into the vector index.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use product_vectors::pipeline::migrate_latest;
use tracing::info;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
};

pub async fn migrate_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let service = state.service().await;

    let (report, vocabulary) =
        migrate_latest(service.index().as_ref(), &state.dataset_root).await?;
    state.replace_vocabulary(vocabulary).await;
    info!(
        "migrate_route: {} written, {} stored from {}",
        report.written, report.stored, report.dataset_dir
    );

    Ok(ApiResponse::success(report).into_response_with_status(StatusCode::OK))
}
