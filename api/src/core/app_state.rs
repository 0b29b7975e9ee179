use std::path::PathBuf;
use std::sync::Arc;

use catalog_client::OpenFoodFactsClient;
use product_vectors::{
    AppConfig, DatasetError, QdrantIndex, SimilarityService, Vocabulary, read_migrated_vocabulary,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Swapped wholesale after a migration so queries see the new vocabulary.
    service: RwLock<SimilarityService>,
    /// Root holding timestamped datasets.
    pub dataset_root: PathBuf,
}

impl AppState {
    pub fn new(service: SimilarityService, dataset_root: PathBuf) -> Self {
        Self {
            service: RwLock::new(service),
            dataset_root,
        }
    }

    /// Wires the Open Food Facts client, Qdrant and the vocabulary of the
    /// dataset recorded in `migrated.json`.
    ///
    /// Nothing migrated yet is not fatal: queries fail until `/index/migrate` runs.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let catalog = OpenFoodFactsClient::from_config(cfg.catalog.clone())?;
        let index = QdrantIndex::new(&cfg.qdrant)?;

        let vocabulary = match read_migrated_vocabulary(&cfg.dataset_root) {
            Ok(v) => {
                info!(
                    "Loaded migrated vocabulary with {} categories ({})",
                    v.len(),
                    v.fingerprint()
                );
                v
            }
            Err(DatasetError::NotMigrated(root)) => {
                warn!("Nothing migrated under {:?}; run fetch and migrate first", root);
                Vocabulary::default()
            }
            Err(e) => return Err(e.into()),
        };

        let service = SimilarityService::new(
            vocabulary,
            Arc::new(catalog),
            Arc::new(index),
            cfg.similarity.clone(),
        );
        Ok(Self::new(service, cfg.dataset_root.clone()))
    }

    /// Snapshot of the current service; the lock is released on return.
    pub async fn service(&self) -> SimilarityService {
        self.service.read().await.clone()
    }

    pub async fn replace_vocabulary(&self, vocabulary: Vocabulary) {
        let mut guard = self.service.write().await;
        *guard = guard.with_vocabulary(vocabulary);
    }
}
