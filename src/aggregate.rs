use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::SourceError;
use crate::models::{JobListing, Platform};
use crate::sources::{SourceAdapter, SourceBatch};

/// Upper bound on concurrently running adapters.
pub const MAX_WORKERS: usize = 8;

#[derive(Debug, Clone)]
pub struct SourceReport {
    pub name: String,
    pub platform: Platform,
    pub fetched: usize,
    pub rejected: usize,
    pub error: Option<String>,
}

impl SourceReport {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Default)]
pub struct Aggregation {
    pub listings: Vec<JobListing>,
    pub reports: Vec<SourceReport>,
}

impl Aggregation {
    pub fn all_failed(&self) -> bool {
        !self.reports.is_empty() && self.reports.iter().all(SourceReport::failed)
    }
}

pub struct Aggregator {
    timeout: Duration,
    max_workers: usize,
}

impl Aggregator {
    pub fn new(timeout: Duration, max_workers: usize) -> Self {
        Self {
            timeout,
            max_workers: max_workers.clamp(1, MAX_WORKERS),
        }
    }

    /// Run every adapter and concatenate their listings in adapter order.
    /// Adapters finish in any order; a failed or timed-out adapter contributes
    /// nothing and never affects the others.
    pub async fn run(&self, adapters: &[Box<dyn SourceAdapter>]) -> Aggregation {
        let workers = adapters.len().clamp(1, self.max_workers);
        let timeout = self.timeout;

        let mut results: Vec<(usize, Result<SourceBatch, SourceError>)> =
            stream::iter(adapters.iter().enumerate().map(|(index, adapter)| async move {
                info!(source = adapter.name(), "Fetching listings");
                let result = match tokio::time::timeout(timeout, adapter.fetch()).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout(timeout)),
                };
                (index, result)
            }))
            .buffer_unordered(workers)
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);

        let mut aggregation = Aggregation::default();
        for (index, result) in results {
            let adapter = &adapters[index];
            let report = match result {
                Ok(batch) => {
                    info!(
                        source = adapter.name(),
                        fetched = batch.listings.len(),
                        rejected = batch.rejected,
                        "Source finished"
                    );
                    let report = SourceReport {
                        name: adapter.name().to_string(),
                        platform: adapter.platform(),
                        fetched: batch.listings.len(),
                        rejected: batch.rejected,
                        error: None,
                    };
                    aggregation.listings.extend(batch.listings);
                    report
                }
                Err(e) => {
                    warn!(source = adapter.name(), error = %e, "Source failed, continuing without it");
                    SourceReport {
                        name: adapter.name().to_string(),
                        platform: adapter.platform(),
                        fetched: 0,
                        rejected: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            aggregation.reports.push(report);
        }

        if aggregation.all_failed() {
            warn!(sources = aggregation.reports.len(), "Every source failed; continuing with no listings");
        }

        aggregation
    }
}
