use anyhow::{Context, Result};
use std::path::Path;

use crate::error::SinkError;
use crate::models::{EnrichmentRecord, SCAFFOLD_COLUMNS};

/// Write the header row and one row per record. An empty slice still
/// produces a header-only file so downstream tooling sees a stable schema.
pub fn write(records: &[EnrichmentRecord], destination: &Path) -> Result<usize, SinkError> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SinkError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_err = |source: csv::Error| SinkError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(destination)
        .map_err(write_err)?;

    writer.write_record(SCAFFOLD_COLUMNS).map_err(write_err)?;
    for record in records {
        writer.write_record(record.values()).map_err(write_err)?;
    }
    writer.flush().map_err(|source| SinkError::Flush {
        path: destination.to_path_buf(),
        source,
    })?;

    Ok(records.len())
}

/// Read a scaffold file back into records.
#[cfg(test)]
pub fn read(path: &Path) -> Result<Vec<EnrichmentRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open scaffold file: {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<EnrichmentRecord>, _>>()
        .with_context(|| format!("Failed to parse scaffold file: {}", path.display()))
}

#[derive(Debug)]
pub struct ValidationReport {
    pub missing_columns: Vec<&'static str>,
    pub rows: usize,
    /// First data row as (column, value) pairs, in header order.
    pub first_row: Vec<(String, String)>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.missing_columns.is_empty()
    }
}

/// Check that a CSV carries every scaffold column. Extra columns are allowed.
pub fn validate(path: &Path) -> Result<ValidationReport> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();

    let missing_columns: Vec<&'static str> = SCAFFOLD_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();

    let mut rows = 0;
    let mut first_row = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Malformed row in {}", path.display()))?;
        if rows == 0 {
            first_row = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect();
        }
        rows += 1;
    }

    Ok(ValidationReport {
        missing_columns,
        rows,
        first_row,
    })
}
