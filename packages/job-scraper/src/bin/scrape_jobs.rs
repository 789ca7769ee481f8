//! Job scraper CLI
//!
//! Runs one scrape against the configured job board and prints the
//! response envelope as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use job_scraper::handler;
use job_scraper::{ScrapeEvent, Scraper, ScraperConfig};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scrape-jobs")]
#[command(about = "Scrape job postings into normalized JSON records")]
struct Cli {
    /// Read the invocation event from a JSON file (flags below override it)
    #[arg(long)]
    event: Option<PathBuf>,

    /// Stop after this many listings
    #[arg(long, conflicts_with = "all")]
    max_jobs: Option<usize>,

    /// No listing cap
    #[arg(long)]
    all: bool,

    /// Skip detail lookups and keep listing fields only
    #[arg(long)]
    no_details: bool,

    /// Cancel after this many seconds and return what was collected
    #[arg(long)]
    time_budget_secs: Option<u64>,

    /// Print the HTTP-style wrapper (statusCode, headers, body)
    #[arg(long)]
    lambda: bool,
}

impl Cli {
    fn event(&self) -> Result<ScrapeEvent> {
        let mut event = match &self.event {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read event file {}", path.display()))?;
                serde_json::from_str(&raw).context("Failed to parse event JSON")?
            }
            None => ScrapeEvent::default(),
        };

        if self.all {
            event.max_jobs = None;
        } else if let Some(max_jobs) = self.max_jobs {
            event.max_jobs = Some(max_jobs);
        }
        if self.no_details {
            event.include_details = false;
        }
        if self.time_budget_secs.is_some() {
            event.time_budget_secs = self.time_budget_secs;
        }
        Ok(event)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_scraper=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();
    let event = cli.event()?;
    let config = ScraperConfig::from_env().context("Failed to load scraper config")?;

    let response = match Scraper::from_config(config.clone()) {
        Ok(scraper) => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, returning partial results");
                    on_interrupt.cancel();
                }
            });
            handler::handle(&scraper, &event, cancel).await
        }
        // Let the handler shape the failure envelope
        Err(_) => handler::run(config, &event).await,
    };

    let output = if cli.lambda {
        serde_json::to_string_pretty(&response.into_handler_response())
    } else {
        serde_json::to_string_pretty(&response)
    }
    .context("Failed to serialize response")?;

    println!("{output}");
    Ok(())
}
