//! Vector index abstraction.

use std::{future::Future, pin::Pin};

use crate::errors::IndexError;
use crate::record::{ProductRecord, SimilarProduct, SimilarityQuery};
use crate::vocabulary::Vocabulary;

/// Boxed future returned by [`VectorIndex`] methods.
pub type IndexFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, IndexError>> + Send + 'a>>;

/// Nearest-neighbour store for product records.
pub trait VectorIndex: Send + Sync {
    /// Drops the collection if present, recreates it with one dimension per
    /// vocabulary key and writes `records`, each tagged with
    /// `vocabulary.fingerprint()`. Returns the number of records written.
    fn replace_collection<'a>(
        &'a self,
        vocabulary: &'a Vocabulary,
        records: &'a [ProductRecord],
    ) -> IndexFuture<'a, u64>;

    /// Nearest first, at most `query.limit` hits, never `query.exclude_code`.
    /// Hits carry the vocabulary fingerprint they were stored with.
    fn query(&self, query: SimilarityQuery) -> IndexFuture<'_, Vec<SimilarProduct>>;

    /// Exact number of stored points.
    fn count(&self) -> IndexFuture<'_, u64>;

    /// Configured vector size, `None` when the collection does not exist.
    fn dimension(&self) -> IndexFuture<'_, Option<usize>>;
}
