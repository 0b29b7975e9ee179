mod core;
mod error_handler;
mod routes;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

use crate::routes::{
    index_stats::index_stats_route::index_stats_route,
    migrate::migrate_route::migrate_route,
    similar_products::similar_products_route::similar_products_route,
};

/// All routes over a shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/products/{code}/similar", get(similar_products_route))
        .route("/index/migrate", post(migrate_route))
        .route("/index/stats", get(index_stats_route))
        .with_state(state)
}

/// Binds `address` and serves until Ctrl+C.
pub async fn start(state: AppState, address: &str) -> AppResult<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(AppError::Bind)?;
    info!("Listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
