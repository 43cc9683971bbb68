//! Clinical dataset CSV reader.
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use csv::StringRecord;

use crate::data_handling::{ClinicalRecord, Dataset, FEATURES, OUTCOME_COLUMN};
use crate::error::{DiagnosisError, Result};

/// Load the dataset file at `path`.
///
/// Fails with `DataUnavailable` when the file cannot be opened, a required
/// column is absent, or a row does not parse.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = std::fs::File::open(&path).map_err(|e| {
        DiagnosisError::DataUnavailable(format!(
            "failed to open dataset {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    let dataset = read_dataset(file)?;
    log::debug!(
        "Loaded {} clinical records from {}",
        dataset.n_rows(),
        path.as_ref().display()
    );
    Ok(dataset)
}

/// Parse a dataset from any comma-separated source with a header row.
pub fn read_dataset<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| DiagnosisError::DataUnavailable(format!("failed to read header row: {}", e)))?
        .clone();
    check_required_columns(&headers)?;

    let mut records = Vec::new();
    for (row_idx, result) in reader.deserialize::<ClinicalRecord>().enumerate() {
        let record = result.map_err(|e| {
            DiagnosisError::DataUnavailable(format!("invalid row {}: {}", row_idx + 1, e))
        })?;
        records.push(record);
    }

    Dataset::from_records(records)
}

fn check_required_columns(headers: &StringRecord) -> Result<()> {
    let missing: Vec<&str> = FEATURES
        .iter()
        .map(|f| f.column_name())
        .chain(std::iter::once(OUTCOME_COLUMN))
        .filter(|name| !headers.iter().any(|h| h == *name))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DiagnosisError::DataUnavailable(format!(
            "missing required columns: {}",
            missing.join(", ")
        )))
    }
}

/// Memoises dataset loads by path.
///
/// A dataset is read at most once per path; later calls hand out the same
/// shared, immutable copy.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Dataset>> {
        let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.as_ref().to_path_buf());
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(dataset) = entries.get(&key) {
            log::trace!("Dataset cache hit for {}", key.display());
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(load_dataset(&key)?);
        entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
