//! Load-once dataset for the lifetime of the process.

use std::path::Path;
use std::sync::OnceLock;

use super::loader::load_file;
use super::model::SalesDataset;
use crate::error::LoadError;

static DATASET: OnceLock<SalesDataset> = OnceLock::new();

/// Return the process-wide dataset, reading `path` on first use only.
///
/// Once a load has succeeded the cell is never invalidated; later calls
/// return the same dataset whatever path they pass. A failed load leaves
/// the cell empty so the next call retries.
pub fn dataset(path: &Path) -> Result<&'static SalesDataset, LoadError> {
    if let Some(ds) = DATASET.get() {
        return Ok(ds);
    }

    let loaded = load_file(path)?;
    log::info!(
        "Loaded {} transactions from {} ({} regions, {} products)",
        loaded.len(),
        path.display(),
        loaded.regions.len(),
        loaded.products.len()
    );
    Ok(DATASET.get_or_init(|| loaded))
}

/// Whether the dataset has already been loaded.
pub fn is_loaded() -> bool {
    DATASET.get().is_some()
}
