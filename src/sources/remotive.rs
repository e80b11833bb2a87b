use async_trait::async_trait;
use serde::Deserialize;

use super::{SourceAdapter, SourceBatch, http, parse_posted_at};
use crate::error::SourceError;
use crate::models::{JobListing, Platform};

pub const REMOTIVE_API_URL: &str = "https://remotive.io/api/remote-jobs";

#[derive(Debug, Deserialize)]
struct RemotivePayload {
    #[serde(default)]
    jobs: Vec<RemotiveJob>,
}

#[derive(Debug, Deserialize)]
struct RemotiveJob {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    candidate_required_location: Option<String>,
    #[serde(default)]
    publication_date: Option<String>,
}

pub struct RemotiveSource {
    client: reqwest::Client,
    endpoint: String,
}

impl RemotiveSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoint(client, REMOTIVE_API_URL)
    }

    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for RemotiveSource {
    async fn fetch(&self) -> Result<SourceBatch, SourceError> {
        let body = http::get_text(&self.client, &self.endpoint).await?;
        parse_payload(&body)
    }

    fn name(&self) -> &str {
        "remotive"
    }

    fn platform(&self) -> Platform {
        Platform::Remotive
    }
}

/// Remotive wraps listings in a top-level `jobs` key; a payload without it
/// simply has no listings.
pub fn parse_payload(body: &str) -> Result<SourceBatch, SourceError> {
    let payload: RemotivePayload = serde_json::from_str(body)?;

    let mapped = payload.jobs.into_iter().map(|job| {
        JobListing::new(
            job.title.as_deref().unwrap_or_default(),
            job.company_name.as_deref().unwrap_or_default(),
            job.url.as_deref().unwrap_or_default(),
            Platform::Remotive,
        )
        .with_location(job.candidate_required_location.as_deref().unwrap_or_default())
        .with_posted_at(job.publication_date.as_deref().and_then(parse_posted_at))
    });

    Ok(SourceBatch::from_mapped(mapped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_maps_fields() {
        let body = r#"{
            "job-count": 2,
            "jobs": [
                {
                    "id": 42,
                    "title": "Backend Engineer",
                    "company_name": "Acme",
                    "url": "https://remotive.io/job/42",
                    "candidate_required_location": "Worldwide",
                    "publication_date": "2024-05-02T09:15:00"
                },
                {
                    "id": 43,
                    "title": "Data Engineer",
                    "company_name": null,
                    "url": "https://remotive.io/job/43"
                }
            ]
        }"#;

        let batch = parse_payload(body).unwrap();
        assert_eq!(batch.rejected, 0);
        assert_eq!(batch.listings.len(), 2);

        let first = &batch.listings[0];
        assert_eq!(first.title, "Backend Engineer");
        assert_eq!(first.company, "Acme");
        assert_eq!(first.url, "https://remotive.io/job/42");
        assert_eq!(first.platform, Platform::Remotive);
        assert_eq!(first.location, "Worldwide");
        assert!(first.posted_at.is_some());

        let second = &batch.listings[1];
        assert_eq!(second.company, "");
        assert_eq!(second.location, "");
        assert!(second.posted_at.is_none());
    }

    #[test]
    fn test_parse_payload_without_jobs_key_is_empty() {
        let batch = parse_payload(r#"{"legal": "terms"}"#).unwrap();
        assert!(batch.listings.is_empty());
    }

    #[test]
    fn test_parse_payload_rejects_unidentifiable_jobs() {
        let body = r#"{"jobs": [{"company_name": "Ghost"}, {"title": "QA Lead"}]}"#;
        let batch = parse_payload(body).unwrap();
        assert_eq!(batch.listings.len(), 1);
        assert_eq!(batch.rejected, 1);
    }

    #[test]
    fn test_parse_payload_malformed() {
        assert!(matches!(parse_payload("<html>"), Err(SourceError::Parse(_))));
        assert!(matches!(parse_payload("42"), Err(SourceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_from_endpoint() {
        let url = http::tests::serve_once(
            "200 OK",
            r#"{"jobs": [{"title": "Backend Engineer", "company_name": "Acme", "url": "https://remotive.io/job/42"}]}"#,
        )
        .await;

        let batch = RemotiveSource::with_endpoint(http::tests::test_client(), url)
            .fetch()
            .await
            .unwrap();
        assert_eq!(batch.listings.len(), 1);
        assert_eq!(batch.listings[0].company, "Acme");
    }

    #[tokio::test]
    async fn test_fetch_service_unavailable() {
        let url = http::tests::serve_once("503 Service Unavailable", "busy").await;
        let result = RemotiveSource::with_endpoint(http::tests::test_client(), url).fetch().await;
        assert!(matches!(result, Err(SourceError::Http { status: 503, .. })));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_live() {
        let client = http::build_client(
            std::time::Duration::from_secs(30),
            http::DEFAULT_USER_AGENT,
        )
        .unwrap();
        let batch = RemotiveSource::new(client).fetch().await.unwrap();
        assert!(batch.listings.iter().all(|l| l.platform == Platform::Remotive));
    }
}
