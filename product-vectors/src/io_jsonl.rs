//! JSONL helpers for product records.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::errors::DatasetError;
use crate::record::ProductRecord;

/// Writes one record per line, truncating any existing file.
pub fn write_records(path: impl AsRef<Path>, records: &[ProductRecord]) -> Result<(), DatasetError> {
    let path = path.as_ref();
    let mut w = BufWriter::new(File::create(path)?);
    for r in records {
        serde_json::to_writer(&mut w, r)?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    debug!("Wrote {} records to {:?}", records.len(), path);
    Ok(())
}

/// Reads records strictly. Empty lines are skipped; a malformed line is fatal.
///
/// # Errors
/// - [`DatasetError::Io`] if the file cannot be read.
/// - [`DatasetError::Line`] with the 1-based line number of the first bad row.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<ProductRecord>, DatasetError> {
    let path = path.as_ref();
    info!("Reading product records: {:?}", path);

    let reader = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let r: ProductRecord =
            serde_json::from_str(&line).map_err(|source| DatasetError::Line {
                path: path.to_path_buf(),
                line: i + 1,
                source,
            })?;
        out.push(r);
    }

    debug!("Loaded {} product records", out.len());
    Ok(out)
}
