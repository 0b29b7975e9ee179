//! Timestamped dataset directories: vocabulary, records and a summary.
//!
//! Layout of one dataset:
//! `<root>/<YYYYMMDD_HHMMSS>/{vocabulary.json, products.jsonl, summary.json}`.
//! `<root>/migrated.json` names the dataset currently loaded into the index.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::discovery::{
    DATASET_DIR_FORMAT, latest_dataset_dir, migration_marker_path, products_path, summary_path,
    vocabulary_path,
};
use crate::errors::DatasetError;
use crate::io_jsonl::{read_records, write_records};
use crate::record::ProductRecord;
use crate::vocabulary::Vocabulary;

/// Counters collected while fetching catalog pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchStats {
    pub pages_fetched: u32,
    pub pages_failed: u32,
}

/// Contents of `summary.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub created_at: DateTime<Utc>,
    /// Absolute output directory.
    #[serde(default)]
    pub out_dir: Option<String>,
    pub vocabulary_size: usize,
    pub products: usize,
    pub pages_fetched: u32,
    pub pages_failed: u32,
    /// Logical name -> file path.
    pub files: BTreeMap<String, String>,
}

/// A dataset loaded back from disk.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub dir: PathBuf,
    pub vocabulary: Vocabulary,
    pub records: Vec<ProductRecord>,
}

/// Writes a new dataset under `root/<now>`.
pub fn write_dataset(
    root: impl AsRef<Path>,
    vocabulary: &Vocabulary,
    records: &[ProductRecord],
    stats: FetchStats,
) -> Result<DatasetSummary, DatasetError> {
    let dir = root
        .as_ref()
        .join(Utc::now().format(DATASET_DIR_FORMAT).to_string());
    write_dataset_to(dir, vocabulary, records, stats)
}

/// Writes a dataset into `dir`, creating it if needed.
///
/// # Errors
/// [`DatasetError::AlreadyExists`] if `dir` already holds a dataset.
pub fn write_dataset_to(
    dir: impl AsRef<Path>,
    vocabulary: &Vocabulary,
    records: &[ProductRecord],
    stats: FetchStats,
) -> Result<DatasetSummary, DatasetError> {
    let dir = dir.as_ref();
    if vocabulary_path(dir).exists() || products_path(dir).exists() {
        return Err(DatasetError::AlreadyExists(dir.to_path_buf()));
    }
    fs::create_dir_all(dir)?;

    let vocab_file = vocabulary_path(dir);
    let products_file = products_path(dir);
    fs::write(&vocab_file, serde_json::to_vec_pretty(vocabulary)?)?;
    write_records(&products_file, records)?;

    let abs = |p: &Path| {
        fs::canonicalize(p)
            .unwrap_or_else(|_| p.to_path_buf())
            .display()
            .to_string()
    };

    let summary = DatasetSummary {
        created_at: Utc::now(),
        out_dir: Some(abs(dir)),
        vocabulary_size: vocabulary.len(),
        products: records.len(),
        pages_fetched: stats.pages_fetched,
        pages_failed: stats.pages_failed,
        files: BTreeMap::from([
            ("vocabulary".to_string(), abs(&vocab_file)),
            ("products".to_string(), abs(&products_file)),
        ]),
    };
    fs::write(summary_path(dir), serde_json::to_vec_pretty(&summary)?)?;

    info!(
        "Dataset written to {:?}: {} categories, {} products",
        dir, summary.vocabulary_size, summary.products
    );
    Ok(summary)
}

pub fn read_vocabulary(dir: impl AsRef<Path>) -> Result<Vocabulary, DatasetError> {
    let data = fs::read(vocabulary_path(dir))?;
    Ok(serde_json::from_slice(&data)?)
}

pub fn read_summary(dir: impl AsRef<Path>) -> Result<DatasetSummary, DatasetError> {
    let data = fs::read(summary_path(dir))?;
    Ok(serde_json::from_slice(&data)?)
}

/// Loads vocabulary and records, checking every vector against the vocabulary.
///
/// # Errors
/// [`DatasetError::VectorSizeMismatch`] for the first record built against
/// another vocabulary; I/O and parse errors otherwise.
pub fn read_dataset(dir: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    let dir = dir.as_ref();
    let vocabulary = read_vocabulary(dir)?;
    let records = read_records(products_path(dir))?;

    if let Some(bad) = records.iter().find(|r| r.vector.len() != vocabulary.len()) {
        return Err(DatasetError::VectorSizeMismatch {
            code: bad.code.clone(),
            got: bad.vector.len(),
            want: vocabulary.len(),
        });
    }

    debug!(
        "Dataset {:?}: {} categories, {} products",
        dir,
        vocabulary.len(),
        records.len()
    );
    Ok(Dataset {
        dir: dir.to_path_buf(),
        vocabulary,
        records,
    })
}

pub fn read_latest_dataset(root: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
    read_dataset(latest_dataset_dir(root)?)
}

/// Contents of `migrated.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationMarker {
    /// Dataset directory name, relative to the root.
    pub dataset: String,
    pub vocabulary_size: usize,
    /// [`Vocabulary::fingerprint`] at migration time.
    pub vocabulary_id: String,
    pub migrated_at: DateTime<Utc>,
}

/// Records `dataset` as the one loaded into the index.
pub fn write_migration_marker(
    root: impl AsRef<Path>,
    dataset: &Dataset,
) -> Result<MigrationMarker, DatasetError> {
    let root = root.as_ref();
    let name = dataset
        .dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| DatasetError::NotFound(dataset.dir.clone()))?;

    let marker = MigrationMarker {
        dataset: name,
        vocabulary_size: dataset.vocabulary.len(),
        vocabulary_id: dataset.vocabulary.fingerprint(),
        migrated_at: Utc::now(),
    };
    fs::create_dir_all(root)?;
    fs::write(migration_marker_path(root), serde_json::to_vec_pretty(&marker)?)?;
    debug!("Migration marker -> {}", marker.dataset);
    Ok(marker)
}

/// Reads `<root>/migrated.json`.
///
/// # Errors
/// [`DatasetError::NotMigrated`] if no migration was recorded under `root`.
pub fn read_migration_marker(root: impl AsRef<Path>) -> Result<MigrationMarker, DatasetError> {
    let root = root.as_ref();
    let path = migration_marker_path(root);
    if !path.exists() {
        return Err(DatasetError::NotMigrated(root.to_path_buf()));
    }
    Ok(serde_json::from_slice(&fs::read(path)?)?)
}

/// Vocabulary of the dataset that was last migrated, which may be older than
/// the latest dataset on disk.
///
/// # Errors
/// - [`DatasetError::NotMigrated`] if nothing was migrated yet.
/// - [`DatasetError::VocabularyChanged`] if the dataset's vocabulary file no
///   longer matches the recorded fingerprint.
pub fn read_migrated_vocabulary(root: impl AsRef<Path>) -> Result<Vocabulary, DatasetError> {
    let root = root.as_ref();
    let marker = read_migration_marker(root)?;
    let dir = root.join(&marker.dataset);
    let vocabulary = read_vocabulary(&dir)?;

    let found = vocabulary.fingerprint();
    if found != marker.vocabulary_id {
        warn!("Vocabulary of {:?} was modified after migration", dir);
        return Err(DatasetError::VocabularyChanged {
            dataset: dir,
            expected: marker.vocabulary_id,
            found,
        });
    }
    Ok(vocabulary)
}
