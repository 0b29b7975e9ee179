//! Product vectorization and similar-product search over Qdrant.
//!
//! This crate provides:
//! - A [`Vocabulary`] of recipe categories built from a batch of catalog products
//! - Projection of each product onto that vocabulary ([`vectorize`], [`prepare_batch`])
//! - Timestamped datasets on disk and their migration into a [`VectorIndex`]
//! - Top‑K similar products for a barcode, never returning the barcode itself
//!
//! Collaborators (catalog, index) are trait objects so they can be swapped for
//! in-memory doubles.

mod batch;
mod catalog;
mod config;
mod dataset;
mod discovery;
mod errors;
mod filters;
mod index;
mod io_jsonl;
mod qdrant_facade;
mod record;
mod similarity;
mod vectorizer;
mod vocabulary;

pub mod pipeline;

pub use batch::prepare_batch;
pub use catalog::{CatalogFuture, ProductCatalog};
pub use config::{AppConfig, DEFAULT_TOP_K, DistanceKind, QdrantConfig, SimilarityOptions};
pub use dataset::{
    Dataset, DatasetSummary, FetchStats, MigrationMarker, read_dataset, read_latest_dataset,
    read_migrated_vocabulary, read_migration_marker, read_summary, read_vocabulary,
    write_dataset, write_dataset_to, write_migration_marker,
};
pub use discovery::latest_dataset_dir;
pub use errors::{ConfigError, DatasetError, IndexError, PipelineError, SimilarityError};
pub use index::{IndexFuture, VectorIndex};
pub use qdrant_facade::QdrantIndex;
pub use record::{ProductRecord, SimilarProduct, SimilarityQuery};
pub use similarity::find_similar;
pub use vectorizer::{DEFAULT_PUBLIC_PRODUCT_URL, vectorize, vectorize_product};
pub use vocabulary::{
    DEFAULT_VOCABULARY_MAX_SIZE, DEFAULT_VOCABULARY_PREFIX, Vocabulary, VocabularyBuilder,
    VocabularyOptions,
};

use std::sync::Arc;

use tracing::trace;

/// Query facade owning one vocabulary and its collaborators.
///
/// Cheap to clone; the vocabulary and collaborators are shared.
#[derive(Clone)]
pub struct SimilarityService {
    vocabulary: Arc<Vocabulary>,
    catalog: Arc<dyn ProductCatalog>,
    index: Arc<dyn VectorIndex>,
    opts: SimilarityOptions,
}

impl SimilarityService {
    pub fn new(
        vocabulary: Vocabulary,
        catalog: Arc<dyn ProductCatalog>,
        index: Arc<dyn VectorIndex>,
        opts: SimilarityOptions,
    ) -> Self {
        Self {
            vocabulary: Arc::new(vocabulary),
            catalog,
            index,
            opts,
        }
    }

    /// See [`find_similar`].
    ///
    /// # Errors
    /// Propagates [`SimilarityError`] unchanged.
    pub async fn find_similar(&self, code: &str) -> Result<Vec<SimilarProduct>, SimilarityError> {
        trace!("SimilarityService::find_similar code={code}");
        similarity::find_similar(
            code,
            &self.vocabulary,
            self.catalog.as_ref(),
            self.index.as_ref(),
            &self.opts,
        )
        .await
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub fn options(&self) -> &SimilarityOptions {
        &self.opts
    }

    /// Same collaborators, new vocabulary (after a migration).
    pub fn with_vocabulary(&self, vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary: Arc::new(vocabulary),
            ..self.clone()
        }
    }
}
