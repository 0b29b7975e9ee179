//! Batch pipelines: catalog → dataset on disk, dataset → vector index.

use std::path::Path;

use catalog_client::CatalogProduct;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::batch::prepare_batch;
use crate::catalog::ProductCatalog;
use crate::config::AppConfig;
use crate::dataset::{
    Dataset, DatasetSummary, FetchStats, read_latest_dataset, write_dataset,
    write_migration_marker,
};
use crate::errors::PipelineError;
use crate::index::VectorIndex;
use crate::vocabulary::Vocabulary;

/// Outcome of loading a dataset into the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub dataset_dir: String,
    pub vocabulary_size: usize,
    /// [`Vocabulary::fingerprint`] stamped on every point.
    pub vocabulary_id: String,
    /// Records sent to the index.
    pub written: u64,
    /// Exact point count reported by the index afterwards.
    pub stored: u64,
}

/// Fetches pages `1..=pages` one after another. Failed pages are logged and skipped.
pub async fn fetch_catalog_pages(
    catalog: &dyn ProductCatalog,
    pages: u32,
) -> (Vec<CatalogProduct>, FetchStats) {
    let mut items = Vec::new();
    let mut stats = FetchStats::default();

    for page in 1..=pages {
        match catalog.fetch_page(page).await {
            Ok(batch) => {
                info!("Fetched page {page}/{pages}: {} products", batch.len());
                stats.pages_fetched += 1;
                items.extend(batch);
            }
            Err(e) => {
                warn!("Skipping page {page}/{pages}: {e}");
                stats.pages_failed += 1;
            }
        }
    }

    (items, stats)
}

/// Fetches the catalog, builds vocabulary and records, writes a new dataset.
///
/// # Errors
/// [`PipelineError::NoProducts`] if nothing usable came back;
/// [`PipelineError::Dataset`] on write failures.
pub async fn build_dataset(
    catalog: &dyn ProductCatalog,
    cfg: &AppConfig,
) -> Result<DatasetSummary, PipelineError> {
    let (items, stats) = fetch_catalog_pages(catalog, cfg.catalog_pages).await;

    let vocabulary = Vocabulary::build(&items, &cfg.vocabulary);
    let records = prepare_batch(&items, &vocabulary, &cfg.similarity.public_product_url);
    if vocabulary.is_empty() || records.is_empty() {
        return Err(PipelineError::NoProducts);
    }

    Ok(write_dataset(&cfg.dataset_root, &vocabulary, &records, stats)?)
}

/// Replaces the index collection with `dataset`.
pub async fn migrate_dataset(
    index: &dyn VectorIndex,
    dataset: &Dataset,
) -> Result<MigrationReport, PipelineError> {
    let written = index
        .replace_collection(&dataset.vocabulary, &dataset.records)
        .await?;
    let stored = index.count().await?;
    info!("Products in index: {stored}");

    Ok(MigrationReport {
        dataset_dir: dataset.dir.display().to_string(),
        vocabulary_size: dataset.vocabulary.len(),
        vocabulary_id: dataset.vocabulary.fingerprint(),
        written,
        stored,
    })
}

/// [`migrate_dataset`] for the newest dataset under `root`, then records it
/// in `migrated.json` so queries load the same vocabulary.
///
/// Returns the report and the vocabulary now backing the index.
pub async fn migrate_latest(
    index: &dyn VectorIndex,
    root: impl AsRef<Path>,
) -> Result<(MigrationReport, Vocabulary), PipelineError> {
    let root = root.as_ref();
    let dataset = read_latest_dataset(root)?;
    let report = migrate_dataset(index, &dataset).await?;
    write_migration_marker(root, &dataset)?;
    Ok((report, dataset.vocabulary))
}
