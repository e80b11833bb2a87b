use anyhow::Result;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::aggregate::{Aggregator, SourceReport};
use crate::config::PipelineConfig;
use crate::dedupe::dedupe;
use crate::history::History;
use crate::import::ImportSource;
use crate::sink;
use crate::scaffold;
use crate::sources::{self, SourceAdapter, UnavailableSource, http};

/// Outcome of one run, for whatever presentation layer runs the pipeline.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub sources: Vec<SourceReport>,
    pub fetched: usize,
    pub rejected: usize,
    pub duplicates_removed: usize,
    pub previously_seen: usize,
    pub records_written: usize,
    pub output: PathBuf,
    pub warnings: Vec<String>,
}

impl RunSummary {
    pub fn failed_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.failed()).count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sources:")?;
        for source in &self.sources {
            match &source.error {
                Some(error) => writeln!(f, "  {:<28} {:<9} FAILED: {}", source.name, source.platform, error)?,
                None if source.rejected > 0 => writeln!(
                    f,
                    "  {:<28} {:<9} {} listings ({} rows dropped)",
                    source.name, source.platform, source.fetched, source.rejected
                )?,
                None => writeln!(f, "  {:<28} {:<9} {} listings", source.name, source.platform, source.fetched)?,
            }
        }
        writeln!(f, "\nResults:")?;
        writeln!(f, "  Fetched:            {}", self.fetched)?;
        writeln!(f, "  Rows dropped:       {}", self.rejected)?;
        writeln!(f, "  Duplicates removed: {}", self.duplicates_removed)?;
        if self.previously_seen > 0 {
            writeln!(f, "  Seen in past runs:  {}", self.previously_seen)?;
        }
        writeln!(f, "  Records written:    {}", self.records_written)?;
        write!(f, "  Output:             {}", self.output.display())?;
        for warning in &self.warnings {
            write!(f, "\n  Warning: {}", warning)?;
        }
        Ok(())
    }
}

/// Live sources in configured order, followed by import files. If the HTTP
/// client cannot be built every live source reports that failure on its own.
pub fn build_adapters(config: &PipelineConfig) -> Vec<Box<dyn SourceAdapter>> {
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();

    if !config.sources.is_empty() {
        match http::build_client(config.timeout, &config.user_agent) {
            Ok(client) => {
                for kind in &config.sources {
                    adapters.push(sources::create_source(*kind, client.clone()));
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to build HTTP client, live sources will be skipped");
                let reason = e.to_string();
                for kind in &config.sources {
                    adapters.push(Box::new(UnavailableSource::new(*kind, reason.clone())));
                }
            }
        }
    }

    for path in &config.imports {
        adapters.push(Box::new(ImportSource::new(path.clone(), config.import_platform)));
    }

    adapters
}

pub async fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let adapters = build_adapters(config);
    run_with(&adapters, config).await
}

/// Aggregate, dedupe, optionally drop previously emitted listings, build the
/// scaffold and write it. Only a sink failure is returned as an error.
pub async fn run_with(adapters: &[Box<dyn SourceAdapter>], config: &PipelineConfig) -> Result<RunSummary> {
    let mut summary = RunSummary {
        output: config.output.clone(),
        ..RunSummary::default()
    };

    let aggregation = Aggregator::new(config.timeout, config.max_workers)
        .run(adapters)
        .await;

    if aggregation.all_failed() {
        summary.warnings.push("every source failed; the scaffold will be empty".to_string());
    }
    summary.fetched = aggregation.listings.len();
    summary.rejected = aggregation.reports.iter().map(|r| r.rejected).sum();
    summary.sources = aggregation.reports;

    let mut listings = dedupe(&aggregation.listings);
    summary.duplicates_removed = summary.fetched - listings.len();
    info!(
        fetched = summary.fetched,
        unique = listings.len(),
        duplicates = summary.duplicates_removed,
        "Deduplicated listings"
    );

    let history = match &config.history {
        Some(path) => match History::open(path) {
            Ok(history) => Some(history),
            Err(e) => {
                warn!(error = %e, "History unavailable, keeping every listing");
                summary.warnings.push(format!("history unavailable ({:#}); previously seen listings were kept", e));
                None
            }
        },
        None => None,
    };

    if let Some(history) = &history {
        match history.partition_new(listings.clone()) {
            Ok((fresh, skipped)) => {
                info!(path = %history.path().display(), skipped, "Dropped listings seen in earlier runs");
                listings = fresh;
                summary.previously_seen = skipped;
            }
            Err(e) => {
                warn!(error = %e, "History lookup failed, keeping every listing");
                summary.warnings.push(format!("history lookup failed ({:#})", e));
            }
        }
    }

    if listings.is_empty() {
        warn!("No listings to write; scaffold will contain only the header");
        summary.warnings.push("no listings to write; scaffold contains only the header".to_string());
    }

    let records = scaffold::build(&listings);
    summary.records_written = sink::write(&records, &config.output)?;
    info!(path = %config.output.display(), records = summary.records_written, "Scaffold written");

    if let Some(history) = &history {
        match history.record_all(&listings) {
            Ok(recorded) => info!(recorded, total = history.count().unwrap_or_default(), "History updated"),
            Err(e) => {
                warn!(error = %e, "Failed to record listings in history");
                summary.warnings.push(format!("failed to update history ({:#})", e));
            }
        }
    }

    info!(
        sources = summary.sources.len(),
        failed = summary.failed_sources(),
        written = summary.records_written,
        "Run complete"
    );
    Ok(summary)
}
