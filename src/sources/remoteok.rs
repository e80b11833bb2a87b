use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{SourceAdapter, SourceBatch, http, parse_posted_at};
use crate::error::SourceError;
use crate::models::{JobListing, Platform};

pub const REMOTEOK_API_URL: &str = "https://remoteok.com/api";
const REMOTEOK_BASE_URL: &str = "https://remoteok.com";

#[derive(Debug, Deserialize)]
struct RemoteOkJob {
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

pub struct RemoteOkSource {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteOkSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoint(client, REMOTEOK_API_URL)
    }

    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for RemoteOkSource {
    async fn fetch(&self) -> Result<SourceBatch, SourceError> {
        let body = http::get_text(&self.client, &self.endpoint).await?;
        parse_payload(&body)
    }

    fn name(&self) -> &str {
        "remoteok"
    }

    fn platform(&self) -> Platform {
        Platform::RemoteOk
    }
}

/// RemoteOK answers with a bare array whose first element is a legal/metadata
/// notice rather than a job.
pub fn parse_payload(body: &str) -> Result<SourceBatch, SourceError> {
    let entries: Vec<Value> = serde_json::from_str(body)?;

    let mut batch = SourceBatch::default();
    for (index, entry) in entries.into_iter().enumerate().skip(1) {
        let job: RemoteOkJob = match serde_json::from_value(entry) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(source = "remoteok", index, error = %e, "Skipping malformed entry");
                batch.rejected += 1;
                continue;
            }
        };

        let title = job
            .position
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .or(job.title.as_deref())
            .unwrap_or_default();

        let listing = JobListing::new(
            title,
            job.company.as_deref().unwrap_or_default(),
            &absolute_url(job.url.as_deref().unwrap_or_default()),
            Platform::RemoteOk,
        )
        .with_location(job.location.as_deref().unwrap_or_default())
        .with_posted_at(job.date.as_deref().and_then(parse_posted_at));

        if listing.has_identity() {
            batch.listings.push(listing);
        } else {
            batch.rejected += 1;
        }
    }

    Ok(batch)
}

fn absolute_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{}{}", REMOTEOK_BASE_URL, url)
    } else {
        format!("{}/{}", REMOTEOK_BASE_URL, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_skips_metadata_element() {
        let body = r#"[
            {"last_updated": 1714640000, "legal": "API Terms of Service"},
            {
                "id": "1001",
                "position": "Senior Rust Engineer",
                "company": "Ferris Inc",
                "url": "https://remoteOK.com/remote-jobs/1001",
                "location": "Europe",
                "date": "2024-05-01T10:00:00+00:00"
            },
            {
                "id": "1002",
                "title": "Platform Engineer",
                "company": "Crab Co",
                "url": "/remote-jobs/1002"
            }
        ]"#;

        let batch = parse_payload(body).unwrap();
        assert_eq!(batch.listings.len(), 2);
        assert_eq!(batch.rejected, 0);

        let first = &batch.listings[0];
        assert_eq!(first.title, "Senior Rust Engineer");
        assert_eq!(first.company, "Ferris Inc");
        assert_eq!(first.url, "https://remoteOK.com/remote-jobs/1001");
        assert_eq!(first.location, "Europe");
        assert_eq!(first.platform, Platform::RemoteOk);
        assert!(first.posted_at.is_some());

        let second = &batch.listings[1];
        assert_eq!(second.title, "Platform Engineer");
        assert_eq!(second.url, "https://remoteok.com/remote-jobs/1002");
    }

    #[test]
    fn test_parse_payload_metadata_only() {
        let batch = parse_payload(r#"[{"legal": "terms"}]"#).unwrap();
        assert!(batch.listings.is_empty());
        assert!(parse_payload("[]").unwrap().listings.is_empty());
    }

    #[test]
    fn test_parse_payload_counts_bad_entries() {
        let body = r#"[{"legal": "terms"}, "not a job", {"company": "NoTitle"}, {"position": "SRE"}]"#;
        let batch = parse_payload(body).unwrap();
        assert_eq!(batch.listings.len(), 1);
        assert_eq!(batch.rejected, 2);
    }

    #[test]
    fn test_parse_payload_rejects_object_payload() {
        assert!(matches!(
            parse_payload(r#"{"jobs": []}"#),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(absolute_url(""), "");
        assert_eq!(absolute_url("/remote-jobs/1"), "https://remoteok.com/remote-jobs/1");
        assert_eq!(absolute_url("remote-jobs/1"), "https://remoteok.com/remote-jobs/1");
        assert_eq!(absolute_url("https://remoteok.com/x"), "https://remoteok.com/x");
    }
}
