use crate::models::{EnrichmentRecord, JobListing};

impl From<&JobListing> for EnrichmentRecord {
    fn from(listing: &JobListing) -> Self {
        EnrichmentRecord {
            job_title: listing.title.clone(),
            company: listing.company.clone(),
            original_url: listing.url.clone(),
            ..EnrichmentRecord::default()
        }
    }
}

/// Project listings 1:1 into enrichment rows with every enrichment field blank.
pub fn build(listings: &[JobListing]) -> Vec<EnrichmentRecord> {
    listings.iter().map(EnrichmentRecord::from).collect()
}
