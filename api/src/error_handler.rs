use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog_client::CatalogError;
use product_vectors::{ConfigError, DatasetError, IndexError, PipelineError, SimilarityError};
use thiserror::Error;
use tracing::error;

use crate::core::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("catalog client: {0}")]
    Catalog(#[from] CatalogError),

    #[error("vector index: {0}")]
    Index(#[from] IndexError),

    #[error("dataset: {0}")]
    Dataset(#[from] DatasetError),

    // --- IO / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("invalid product code: {0}")]
    InvalidProductCode(String),

    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidProductCode(_) => StatusCode::BAD_REQUEST,

            AppError::Similarity(SimilarityError::ProductUnavailable { .. }) => {
                StatusCode::NOT_FOUND
            }
            AppError::Similarity(SimilarityError::QueryFailed(_)) => StatusCode::BAD_GATEWAY,
            AppError::Similarity(
                SimilarityError::DimensionMismatch { .. }
                | SimilarityError::VocabularyMismatch { .. },
            ) => StatusCode::INTERNAL_SERVER_ERROR,

            AppError::Pipeline(PipelineError::Dataset(DatasetError::NotFound(_)))
            | AppError::Dataset(DatasetError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Pipeline(PipelineError::Index(_)) | AppError::Index(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Pipeline(PipelineError::NoProducts) | AppError::Catalog(_) => {
                StatusCode::BAD_GATEWAY
            }

            AppError::Pipeline(PipelineError::Dataset(_))
            | AppError::Dataset(_)
            | AppError::Config(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidProductCode(_) => "INVALID_PRODUCT_CODE",
            AppError::Similarity(SimilarityError::ProductUnavailable { .. }) => {
                "PRODUCT_UNAVAILABLE"
            }
            AppError::Similarity(SimilarityError::QueryFailed(_)) => "QUERY_FAILED",
            AppError::Similarity(SimilarityError::DimensionMismatch { .. }) => {
                "DIMENSION_MISMATCH"
            }
            AppError::Similarity(SimilarityError::VocabularyMismatch { .. }) => {
                "VOCABULARY_MISMATCH"
            }
            AppError::Pipeline(PipelineError::Dataset(DatasetError::NotFound(_)))
            | AppError::Dataset(DatasetError::NotFound(_)) => "DATASET_NOT_FOUND",
            AppError::Pipeline(PipelineError::Dataset(_)) | AppError::Dataset(_) => {
                "DATASET_ERROR"
            }
            AppError::Pipeline(PipelineError::Index(_)) | AppError::Index(_) => "INDEX_ERROR",
            AppError::Pipeline(PipelineError::NoProducts) => "NO_PRODUCTS",
            AppError::Catalog(_) => "CATALOG_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), "{self}");
        }
        ApiResponse::<()>::error(self.error_code(), self.to_string())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unavailable_product_is_404_with_stable_code() {
        let err = AppError::from(SimilarityError::ProductUnavailable {
            code: "42".into(),
            source: None,
        });
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "PRODUCT_UNAVAILABLE");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn similarity_failures_map_to_distinct_statuses() {
        let failed = AppError::from(SimilarityError::QueryFailed(IndexError::Qdrant(
            "down".into(),
        )));
        assert_eq!(failed.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(failed.error_code(), "QUERY_FAILED");

        let mismatch = AppError::from(SimilarityError::DimensionMismatch {
            index: 3,
            vocabulary: 2,
        });
        assert_eq!(mismatch.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(mismatch.error_code(), "DIMENSION_MISMATCH");

        let reordered = AppError::from(SimilarityError::VocabularyMismatch {
            index: "a".into(),
            vocabulary: "b".into(),
        });
        assert_eq!(reordered.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reordered.error_code(), "VOCABULARY_MISMATCH");
    }

    #[test]
    fn missing_dataset_is_404() {
        let err = AppError::from(PipelineError::Dataset(DatasetError::NotFound(
            "datasets".into(),
        )));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "DATASET_NOT_FOUND");
    }
}
