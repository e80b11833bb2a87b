use async_trait::async_trait;
use csv::StringRecord;
use std::path::{Path, PathBuf};

use crate::error::{ImportError, SourceError, ValidationError};
use crate::models::{JobListing, Platform};
use crate::sources::{SourceAdapter, SourceBatch, parse_posted_at};

// Column synonyms in priority order. Matching is case-sensitive; the first
// synonym present in the header with a non-empty cell wins.
const TITLE_COLUMNS: &[&str] = &["Job Title", "job_title", "title"];
const COMPANY_COLUMNS: &[&str] = &["Company", "company"];
const URL_COLUMNS: &[&str] = &["URL", "url", "link", "original_url"];
const LOCATION_COLUMNS: &[&str] = &["Location", "location"];
const POSTED_COLUMNS: &[&str] = &["Date Posted", "posted_at", "post_date", "extracted_at"];

/// Header positions for each synonym that the file actually contains.
struct ColumnMap {
    title: Vec<usize>,
    company: Vec<usize>,
    url: Vec<usize>,
    location: Vec<usize>,
    posted_at: Vec<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Self {
        let find = |synonyms: &[&str]| -> Vec<usize> {
            synonyms
                .iter()
                .filter_map(|name| headers.iter().position(|h| h.trim() == *name))
                .collect()
        };
        Self {
            title: find(TITLE_COLUMNS),
            company: find(COMPANY_COLUMNS),
            url: find(URL_COLUMNS),
            location: find(LOCATION_COLUMNS),
            posted_at: find(POSTED_COLUMNS),
        }
    }

    fn first_value<'r>(record: &'r StringRecord, positions: &[usize]) -> &'r str {
        positions
            .iter()
            .filter_map(|&i| record.get(i))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }

    fn map_row(&self, record: &StringRecord, row: usize, platform: Platform) -> Result<JobListing, ValidationError> {
        let title = Self::first_value(record, &self.title);
        if title.is_empty() {
            return Err(ValidationError::MissingTitle(row));
        }

        Ok(JobListing::new(
            title,
            Self::first_value(record, &self.company),
            Self::first_value(record, &self.url),
            platform,
        )
        .with_location(Self::first_value(record, &self.location))
        .with_posted_at(parse_posted_at(Self::first_value(record, &self.posted_at))))
    }
}

/// Read a user-supplied CSV export into listings tagged with `platform`.
/// Rows that fail to parse or lack a title are skipped and counted; only a
/// missing or unreadable file fails the import.
pub fn parse(path: &Path, platform: Platform) -> Result<SourceBatch, ImportError> {
    if !path.exists() {
        return Err(ImportError::NotFound(path.to_path_buf()));
    }

    let unreadable = |source: csv::Error| ImportError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_path(path)
        .map_err(unreadable)?;

    let headers = reader.headers().map_err(unreadable)?.clone();
    let columns = ColumnMap::resolve(&headers);
    if columns.title.is_empty() {
        tracing::warn!(
            path = %path.display(),
            expected = ?TITLE_COLUMNS,
            "Import file has no recognizable title column; every row will be skipped"
        );
    }

    let mut batch = SourceBatch::default();
    for (index, result) in reader.records().enumerate() {
        let row = index + 1;
        let mapped = match result {
            Ok(record) => columns.map_row(&record, row, platform),
            Err(e) => Err(ValidationError::Malformed {
                row,
                reason: e.to_string(),
            }),
        };

        match mapped {
            Ok(listing) => batch.listings.push(listing),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping import row");
                batch.rejected += 1;
            }
        }
    }

    tracing::info!(
        path = %path.display(),
        imported = batch.listings.len(),
        skipped = batch.rejected,
        "Imported listings"
    );
    Ok(batch)
}

pub struct ImportSource {
    path: PathBuf,
    platform: Platform,
    name: String,
}

impl ImportSource {
    pub fn new(path: PathBuf, platform: Platform) -> Self {
        let name = format!("import:{}", path.display());
        Self { path, platform, name }
    }
}

#[async_trait]
impl SourceAdapter for ImportSource {
    /// File reading and CSV parsing run on the blocking pool so a large
    /// export never stalls the HTTP sources polled alongside it.
    async fn fetch(&self) -> Result<SourceBatch, SourceError> {
        let path = self.path.clone();
        let platform = self.platform;
        Ok(tokio::task::spawn_blocking(move || parse(&path, platform)).await??)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}
