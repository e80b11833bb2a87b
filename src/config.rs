use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::aggregate::MAX_WORKERS;
use crate::history::History;
use crate::models::Platform;
use crate::sources::SourceKind;
use crate::sources::http::DEFAULT_USER_AGENT;

pub const DEFAULT_OUTPUT: &str = "output/jobs_scaffold.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Live sources to query, in output order
    #[arg(
        short,
        long,
        env = "JOBSCAFFOLD_SOURCES",
        value_delimiter = ',',
        default_value = "remotive,remoteok"
    )]
    pub sources: Vec<SourceKind>,

    /// CSV export to import alongside the live sources (repeatable)
    #[arg(short, long = "import", env = "JOBSCAFFOLD_IMPORT", value_delimiter = ',')]
    pub imports: Vec<PathBuf>,

    /// Platform tag for imported rows (teal_hq, manual, ...)
    #[arg(long, env = "JOBSCAFFOLD_IMPORT_PLATFORM", default_value = "teal_hq")]
    pub import_platform: Platform,

    /// Scaffold file to write
    #[arg(short, long, env = "JOBSCAFFOLD_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Per-source timeout in seconds
    #[arg(long, env = "JOBSCAFFOLD_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Maximum sources fetched at once (capped at 8)
    #[arg(long, env = "JOBSCAFFOLD_WORKERS", default_value_t = MAX_WORKERS)]
    pub workers: usize,

    /// User-Agent sent to job boards
    #[arg(
        long,
        env = "JOBSCAFFOLD_USER_AGENT",
        default_value = DEFAULT_USER_AGENT,
        value_parser = parse_user_agent
    )]
    pub user_agent: String,

    /// Skip listings already emitted by a previous run
    #[arg(long, env = "JOBSCAFFOLD_ONLY_NEW")]
    pub only_new: bool,

    /// History database used by --only-new
    #[arg(long, env = "JOBSCAFFOLD_HISTORY")]
    pub history: Option<PathBuf>,
}

/// Reject values reqwest could not send as a header.
fn parse_user_agent(raw: &str) -> Result<String, String> {
    reqwest::header::HeaderValue::from_str(raw)
        .map(|_| raw.to_string())
        .map_err(|_| "User-Agent must be a printable header value".to_string())
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sources: Vec<SourceKind>,
    pub imports: Vec<PathBuf>,
    pub import_platform: Platform,
    pub output: PathBuf,
    pub timeout: Duration,
    pub max_workers: usize,
    pub user_agent: String,
    /// Set when cross-run suppression is on.
    pub history: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: SourceKind::ALL.to_vec(),
            imports: Vec::new(),
            import_platform: Platform::TealHq,
            output: PathBuf::from(DEFAULT_OUTPUT),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_workers: MAX_WORKERS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            history: None,
        }
    }
}

impl From<RunArgs> for PipelineConfig {
    fn from(args: RunArgs) -> Self {
        let mut sources = Vec::with_capacity(args.sources.len());
        for kind in args.sources {
            if !sources.contains(&kind) {
                sources.push(kind);
            }
        }

        let history = if args.only_new {
            Some(args.history.unwrap_or_else(History::default_path))
        } else {
            None
        };

        Self {
            sources,
            imports: args.imports,
            import_platform: args.import_platform,
            output: args.output,
            timeout: Duration::from_secs(args.timeout.max(1)),
            max_workers: args.workers.clamp(1, MAX_WORKERS),
            user_agent: args.user_agent,
            history,
        }
    }
}
