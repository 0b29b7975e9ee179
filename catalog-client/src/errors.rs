//! Error hierarchy for the catalog client.

use thiserror::Error;

/// Convenient alias for catalog results.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure talking to the product catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product codes are barcodes: non-empty ASCII digits only.
    #[error("invalid product code: {0:?}")]
    InvalidCode(String),

    /// Search pages are numbered from 1.
    #[error("invalid search page: {0}")]
    InvalidPage(u32),

    /// Base URL is empty or not http(s).
    #[error("invalid catalog base url: {0}")]
    InvalidBaseUrl(String),

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other non-2xx status.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Body could not be decoded into the expected shape.
    #[error("invalid catalog response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return CatalogError::Timeout;
        }

        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                404 => CatalogError::NotFound,
                429 => CatalogError::RateLimited,
                500..=599 => CatalogError::Server(code),
                _ => CatalogError::HttpStatus(code),
            };
        }

        if e.is_decode() {
            return CatalogError::InvalidResponse(e.to_string());
        }

        CatalogError::Network(e.to_string())
    }
}
