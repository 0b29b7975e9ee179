//! Unified error types for the crate.

use std::path::PathBuf;

use catalog_client::CatalogError;
use thiserror::Error;

/// Vector index failures (Qdrant or any other [`crate::VectorIndex`]).
#[derive(Debug, Error)]
pub enum IndexError {
    /// Transport / server error from the index backend.
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// A record's vector does not match the collection dimensionality.
    #[error("vector size mismatch for product {code}: got {got}, want {want}")]
    VectorSizeMismatch {
        code: String,
        got: usize,
        want: usize,
    },

    /// Collections need at least one dimension.
    #[error("invalid collection dimension: {0}")]
    InvalidDimension(usize),

    /// A stored point's payload lacks the product metadata.
    #[error("invalid stored payload: {0}")]
    InvalidPayload(String),

    /// Invalid or unsupported index configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Reading or writing dataset artifacts.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSONL line failed to parse.
    #[error("{path}: line {line}: {source}")]
    Line {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// No dataset directory under the given root.
    #[error("no dataset found under {0}")]
    NotFound(PathBuf),

    /// The target directory already holds a dataset.
    #[error("dataset already exists at {0}")]
    AlreadyExists(PathBuf),

    /// No migration marker under the given root.
    #[error("no migrated dataset recorded under {0}")]
    NotMigrated(PathBuf),

    /// The migrated dataset's vocabulary no longer matches the marker.
    #[error("vocabulary of {dataset} changed since migration: marker {expected}, file {found}")]
    VocabularyChanged {
        dataset: PathBuf,
        expected: String,
        found: String,
    },

    /// A vocabulary file lists the same key twice.
    #[error("duplicate vocabulary key: {0}")]
    DuplicateKey(String),

    /// A stored record was built against a different vocabulary.
    #[error("vector size mismatch for product {code}: got {got}, want {want}")]
    VectorSizeMismatch {
        code: String,
        got: usize,
        want: usize,
    },
}

/// Environment / configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures of a similar-product query.
#[derive(Debug, Error)]
pub enum SimilarityError {
    /// The catalog could not resolve the code, or the product lacks a name,
    /// code or category weights.
    #[error("product {code} is unavailable or incomplete")]
    ProductUnavailable {
        code: String,
        #[source]
        source: Option<CatalogError>,
    },

    /// The index rejected the query.
    #[error("query failed: {0}")]
    QueryFailed(#[source] IndexError),

    /// The stored collection was built against a different vocabulary.
    #[error("dimension mismatch: index expects {index}, vocabulary has {vocabulary}")]
    DimensionMismatch { index: usize, vocabulary: usize },

    /// Same size, different keys or key order.
    #[error("vocabulary mismatch: index holds {index}, query uses {vocabulary}")]
    VocabularyMismatch { index: String, vocabulary: String },
}

/// Failures of the fetch / migrate pipelines.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Index(#[from] IndexError),

    /// Every catalog page failed or returned nothing usable.
    #[error("no usable products fetched from the catalog")]
    NoProducts,
}
