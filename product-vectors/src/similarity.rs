//! Similar-product lookup: catalog → vector → index query with self-exclusion.

use tracing::{debug, info, warn};

use crate::catalog::ProductCatalog;
use crate::config::SimilarityOptions;
use crate::errors::SimilarityError;
use crate::index::VectorIndex;
use crate::record::{SimilarProduct, SimilarityQuery};
use crate::vectorizer::vectorize_product;
use crate::vocabulary::Vocabulary;

/// Returns up to `opts.top_k` products nearest to `code`, nearest first.
///
/// The queried product itself is never part of the result.
///
/// # Errors
/// - [`SimilarityError::ProductUnavailable`] if the catalog fails, does not
///   know `code`, or returns a product without name or category weights.
/// - [`SimilarityError::DimensionMismatch`] if the index was built against a
///   vocabulary of another size.
/// - [`SimilarityError::VocabularyMismatch`] if a hit was stored under a
///   vocabulary with the same size but other keys or key order.
/// - [`SimilarityError::QueryFailed`] if the index errors.
pub async fn find_similar(
    code: &str,
    vocabulary: &Vocabulary,
    catalog: &dyn ProductCatalog,
    index: &dyn VectorIndex,
    opts: &SimilarityOptions,
) -> Result<Vec<SimilarProduct>, SimilarityError> {
    let unavailable = |source| SimilarityError::ProductUnavailable {
        code: code.to_string(),
        source,
    };

    let product = match catalog.fetch_product(code).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            debug!("find_similar: code={code} not in catalog");
            return Err(unavailable(None));
        }
        Err(e) => {
            warn!("find_similar: catalog lookup for code={code} failed: {e}");
            return Err(unavailable(Some(e)));
        }
    };

    let Some(record) = vectorize_product(&product, vocabulary, &opts.public_product_url) else {
        debug!("find_similar: code={code} lacks name or category weights");
        return Err(unavailable(None));
    };

    if let Some(dim) = index
        .dimension()
        .await
        .map_err(SimilarityError::QueryFailed)?
    {
        if dim != vocabulary.len() {
            return Err(SimilarityError::DimensionMismatch {
                index: dim,
                vocabulary: vocabulary.len(),
            });
        }
    }

    let mut hits = index
        .query(SimilarityQuery {
            vector: record.vector,
            limit: opts.top_k,
            exclude_code: Some(record.code.clone()),
        })
        .await
        .map_err(SimilarityError::QueryFailed)?;

    let expected = vocabulary.fingerprint();
    if let Some(stale) = hits
        .iter()
        .filter_map(|h| h.vocabulary_id.as_deref())
        .find(|id| *id != expected)
    {
        warn!("find_similar: index vocabulary {stale} differs from {expected}");
        return Err(SimilarityError::VocabularyMismatch {
            index: stale.to_string(),
            vocabulary: expected,
        });
    }

    let before = hits.len();
    hits.retain(|h| h.code != record.code && h.code != code);
    if hits.len() != before {
        warn!("find_similar: index returned the queried product {code}; dropped");
    }
    hits.truncate(opts.top_k as usize);

    info!("find_similar: code={code} -> {} matches", hits.len());
    Ok(hits)
}
