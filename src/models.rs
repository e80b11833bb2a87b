use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "remotive")]
    Remotive,
    #[serde(rename = "remoteok")]
    RemoteOk,
    #[serde(rename = "teal_hq")]
    TealHq,
    #[serde(rename = "manual")]
    Manual,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Remotive => "remotive",
            Platform::RemoteOk => "remoteok",
            Platform::TealHq => "teal_hq",
            Platform::Manual => "manual",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remotive" => Ok(Platform::Remotive),
            "remoteok" => Ok(Platform::RemoteOk),
            "teal_hq" | "teal" => Ok(Platform::TealHq),
            "manual" => Ok(Platform::Manual),
            other => Err(format!(
                "Unknown platform '{}'. Available: remotive, remoteok, teal_hq, manual",
                other
            )),
        }
    }
}

/// One job posting after normalization. Text fields a source does not
/// provide are empty strings, never missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub url: String,
    pub platform: Platform,
    pub location: String,
    pub posted_at: Option<DateTime<Utc>>,
}

impl JobListing {
    pub fn new(title: &str, company: &str, url: &str, platform: Platform) -> Self {
        Self {
            title: title.trim().to_string(),
            company: company.trim().to_string(),
            url: url.trim().to_string(),
            platform,
            location: String::new(),
            posted_at: None,
        }
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.trim().to_string();
        self
    }

    pub fn with_posted_at(mut self, posted_at: Option<DateTime<Utc>>) -> Self {
        self.posted_at = posted_at;
        self
    }

    /// A listing needs a title or a url to be identifiable downstream.
    pub fn has_identity(&self) -> bool {
        !self.title.is_empty() || !self.url.is_empty()
    }
}

/// Column order of the persisted scaffold file.
pub const SCAFFOLD_COLUMNS: [&str; 16] = [
    "job_title",
    "company",
    "original_url",
    "poster_name",
    "poster_linkedin",
    "poster_title",
    "poster_type",
    "confidence",
    "reason",
    "meta_scrape_status",
    "org_search_status",
    "poster_email",
    "poster_phone",
    "poster_twitter",
    "poster_github",
    "contact_source",
];

/// Enrichment-ready row. Field order matches `SCAFFOLD_COLUMNS`; every
/// enrichment field starts as the empty string for a downstream process to fill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub job_title: String,
    pub company: String,
    pub original_url: String,
    pub poster_name: String,
    pub poster_linkedin: String,
    pub poster_title: String,
    pub poster_type: String,
    pub confidence: String,
    pub reason: String,
    pub meta_scrape_status: String,
    pub org_search_status: String,
    pub poster_email: String,
    pub poster_phone: String,
    pub poster_twitter: String,
    pub poster_github: String,
    pub contact_source: String,
}

impl EnrichmentRecord {
    pub fn values(&self) -> [&str; 16] {
        [
            &self.job_title,
            &self.company,
            &self.original_url,
            &self.poster_name,
            &self.poster_linkedin,
            &self.poster_title,
            &self.poster_type,
            &self.confidence,
            &self.reason,
            &self.meta_scrape_status,
            &self.org_search_status,
            &self.poster_email,
            &self.poster_phone,
            &self.poster_twitter,
            &self.poster_github,
            &self.contact_source,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trips_through_str() {
        for platform in [Platform::Remotive, Platform::RemoteOk, Platform::TealHq, Platform::Manual] {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
        assert_eq!("Teal".parse::<Platform>().unwrap(), Platform::TealHq);
        assert!("indeed".parse::<Platform>().is_err());
    }

    #[test]
    fn test_listing_trims_and_checks_identity() {
        let listing = JobListing::new("  Backend Engineer ", " Acme", "", Platform::Manual);
        assert_eq!(listing.title, "Backend Engineer");
        assert_eq!(listing.company, "Acme");
        assert!(listing.has_identity());

        let empty = JobListing::new(" ", "Acme", "", Platform::Manual);
        assert!(!empty.has_identity());
    }
}
