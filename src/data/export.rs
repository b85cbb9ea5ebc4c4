//! JSON output for the derived tables.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use serde_json::Value as JsonValue;

use super::aggregate::DashboardTables;
use crate::error::ExportError;

/// Write every derived table to `output_path` as pretty-printed JSON.
///
/// Parent directories are created when missing.
pub fn write_tables_json(
    tables: &DashboardTables,
    output_path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let output_path = output_path.as_ref();
    info!("Writing dashboard tables to: {}", output_path.display());

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, tables)?;
    writer.flush()?;
    Ok(())
}

/// Read an exported file back as untyped JSON.
pub fn read_tables_json(path: impl AsRef<Path>) -> Result<JsonValue, ExportError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
