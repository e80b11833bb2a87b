use std::collections::HashSet;

use crate::models::JobListing;

/// Query parameters that only track the click, never identify the job.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "msclkid", "mc_cid", "mc_eid", "ref", "refid", "ref_src",
    "trackingid", "trk", "source", "src",
];

/// Normalized identity of a listing. Two listings with equal fingerprints are
/// the same job, whichever platform they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    Url(String),
    TitleCompany(String, String),
}

impl Fingerprint {
    pub fn of(listing: &JobListing) -> Self {
        if listing.url.trim().is_empty() {
            Fingerprint::TitleCompany(normalize_text(&listing.title), normalize_text(&listing.company))
        } else {
            Fingerprint::Url(normalize_url(&listing.url))
        }
    }

    /// Stable string form, used as the history key.
    pub fn key(&self) -> String {
        match self {
            Fingerprint::Url(url) => format!("url:{}", url),
            Fingerprint::TitleCompany(title, company) => format!("tc:{}|||{}", title, company),
        }
    }
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

/// Lower-case the url, drop tracking parameters and the fragment, and strip
/// trailing slashes. Unparseable input falls back to a lower-cased, slash
/// trimmed copy.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();

    let Ok(mut parsed) = url::Url::parse(raw) else {
        return raw.trim_end_matches('/').to_lowercase();
    };

    parsed.set_fragment(None);

    if parsed.query().is_some() {
        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);

    let mut normalized = parsed.to_string().to_lowercase();
    if parsed.query().is_none() {
        while normalized.ends_with('/') {
            normalized.pop();
        }
    }
    normalized
}

/// Lower-case and collapse runs of whitespace.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Keep the first listing for each fingerprint, preserving input order.
pub fn dedupe(listings: &[JobListing]) -> Vec<JobListing> {
    let mut seen: HashSet<Fingerprint> = HashSet::new();
    listings
        .iter()
        .filter(|listing| seen.insert(Fingerprint::of(listing)))
        .cloned()
        .collect()
}
