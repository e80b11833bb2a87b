mod aggregate;
mod config;
mod dedupe;
mod error;
mod history;
mod import;
mod models;
mod pipeline;
mod scaffold;
mod sink;
mod sources;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{PipelineConfig, RunArgs};
use sources::SourceKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jobscaffold")]
#[command(about = "Aggregate remote-job listings into an enrichment-ready scaffold")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, dedupe and write the scaffold (the default)
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Check that a CSV carries every scaffold column
    Validate {
        /// Path to the scaffold CSV
        file: PathBuf,
    },

    /// List the live sources
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => run_pipeline(cli.run.into()).await?,
        Some(Commands::Run { args }) => run_pipeline(args.into()).await?,

        Some(Commands::Validate { file }) => {
            let report = sink::validate(&file)?;
            if !report.passed() {
                println!("Missing columns: {}", report.missing_columns.join(", "));
            } else {
                println!("{} passed scaffold validation.", file.display());
                println!("Rows: {}", report.rows);
                if !report.first_row.is_empty() {
                    println!("\n{:<20} {}", "COLUMN", "FIRST ROW");
                    println!("{}", "-".repeat(60));
                    for (column, value) in &report.first_row {
                        println!("{:<20} {}", column, truncate(value, 40));
                    }
                }
            }
        }

        Some(Commands::Sources) => {
            println!("{:<12} {}", "SOURCE", "ENDPOINT");
            println!("{}", "-".repeat(50));
            for kind in SourceKind::ALL {
                println!("{:<12} {}", kind.name(), kind.endpoint());
            }
        }
    }

    Ok(())
}

async fn run_pipeline(config: PipelineConfig) -> Result<()> {
    let summary = pipeline::run(&config).await?;
    println!("{}", summary);
    Ok(())
}

const DEFAULT_LOG_FILTER: &str = "jobscaffold=info";

/// `RUST_LOG` wins when it parses; otherwise fall back to info for this crate.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
