pub mod http;
pub mod remoteok;
pub mod remotive;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::SourceError;
use crate::models::{JobListing, Platform};

pub use remoteok::RemoteOkSource;
pub use remotive::RemotiveSource;

// --- Adapter trait ---

/// Listings produced by one adapter, plus the number of raw entries it had
/// to reject because they carried neither a title nor a url.
#[derive(Debug, Default, Clone)]
pub struct SourceBatch {
    pub listings: Vec<JobListing>,
    pub rejected: usize,
}

impl SourceBatch {
    /// Keep identifiable listings, count the rest as rejected.
    pub fn from_mapped(mapped: impl IntoIterator<Item = JobListing>) -> Self {
        let mut batch = SourceBatch::default();
        for listing in mapped {
            if listing.has_identity() {
                batch.listings.push(listing);
            } else {
                batch.rejected += 1;
            }
        }
        batch
    }
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self) -> Result<SourceBatch, SourceError>;
    fn name(&self) -> &str;
    fn platform(&self) -> Platform;
}

// --- Live source registry ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Remotive,
    RemoteOk,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::Remotive, SourceKind::RemoteOk];

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Remotive => "remotive",
            SourceKind::RemoteOk => "remoteok",
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            SourceKind::Remotive => Platform::Remotive,
            SourceKind::RemoteOk => Platform::RemoteOk,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            SourceKind::Remotive => remotive::REMOTIVE_API_URL,
            SourceKind::RemoteOk => remoteok::REMOTEOK_API_URL,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remotive" => Ok(SourceKind::Remotive),
            "remoteok" | "remote-ok" => Ok(SourceKind::RemoteOk),
            other => Err(format!(
                "Unknown source '{}'. Available: remotive, remoteok",
                other
            )),
        }
    }
}

pub fn create_source(kind: SourceKind, client: reqwest::Client) -> Box<dyn SourceAdapter> {
    match kind {
        SourceKind::Remotive => Box::new(RemotiveSource::new(client)),
        SourceKind::RemoteOk => Box::new(RemoteOkSource::new(client)),
    }
}

/// Stands in for a live source whose HTTP client could not be built, so the
/// failure is reported per source instead of aborting the run.
pub struct UnavailableSource {
    kind: SourceKind,
    reason: String,
}

impl UnavailableSource {
    pub fn new(kind: SourceKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for UnavailableSource {
    async fn fetch(&self) -> Result<SourceBatch, SourceError> {
        Err(SourceError::Client(self.reason.clone()))
    }

    fn name(&self) -> &str {
        self.kind.name()
    }

    fn platform(&self) -> Platform {
        self.kind.platform()
    }
}

// --- Shared field helpers ---

/// Parse the timestamp formats job boards hand out. Anything else maps to
/// `None` rather than failing the listing.
pub fn parse_posted_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    tracing::debug!(value = raw, "Unrecognized posting date, leaving empty");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_posted_at_formats() {
        let rfc = parse_posted_at("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 10);

        let naive = parse_posted_at("2024-03-01T12:30:00").unwrap();
        assert_eq!(naive.hour(), 12);

        let date = parse_posted_at("2024-03-01").unwrap();
        assert_eq!(date.day(), 1);

        assert!(parse_posted_at("").is_none());
        assert!(parse_posted_at("yesterday").is_none());
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("Remotive".parse::<SourceKind>().unwrap(), SourceKind::Remotive);
        assert_eq!("remote-ok".parse::<SourceKind>().unwrap(), SourceKind::RemoteOk);
        assert!("indeed".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_batch_rejects_listings_without_identity() {
        let batch = SourceBatch::from_mapped(vec![
            JobListing::new("Backend Engineer", "Acme", "", Platform::Remotive),
            JobListing::new("", "Acme", "", Platform::Remotive),
            JobListing::new("", "", "https://remotive.io/job/1", Platform::Remotive),
        ]);
        assert_eq!(batch.listings.len(), 2);
        assert_eq!(batch.rejected, 1);
    }
}
