//! Discovery utilities to find the latest dataset directory and canonical file paths.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::errors::DatasetError;

/// `strftime` layout of dataset directory names; sorts chronologically.
pub const DATASET_DIR_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Returns `<root>/<latest_timestamp>`.
///
/// Only directories named after [`DATASET_DIR_FORMAT`] are candidates.
///
/// # Errors
/// [`DatasetError::NotFound`] if `root` is missing or holds no dataset directory.
pub fn latest_dataset_dir(root: impl AsRef<Path>) -> Result<PathBuf, DatasetError> {
    let root = root.as_ref();
    trace!("discovery::latest_dataset_dir root={:?}", root);

    let mut best: Option<(std::ffi::OsString, PathBuf)> = None;
    if root.exists() {
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            if !is_dataset_dir_name(&name) {
                trace!("discovery::latest_dataset_dir skipping {:?}", name);
                continue;
            }
            if best.as_ref().is_none_or(|(b, _)| name > *b) {
                best = Some((name, entry.path()));
            }
        }
    }

    let (_, out) = best.ok_or_else(|| DatasetError::NotFound(root.to_path_buf()))?;
    debug!("discovery::latest_dataset_dir -> {:?}", out);
    Ok(out)
}

fn is_dataset_dir_name(name: &std::ffi::OsStr) -> bool {
    name.to_str()
        .is_some_and(|n| NaiveDateTime::parse_from_str(n, DATASET_DIR_FORMAT).is_ok())
}

pub fn vocabulary_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join("vocabulary.json")
}

pub fn products_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join("products.jsonl")
}

pub fn summary_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join("summary.json")
}

/// Marker naming the dataset last loaded into the index. Lives in the root.
pub fn migration_marker_path(root: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join("migrated.json")
}
