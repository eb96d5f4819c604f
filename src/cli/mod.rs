//! CLI command implementations

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::downloader::{BatchConfig, BatchReport, BatchScheduler};
use crate::fetcher::SearchExecutor;
use crate::identifier::TemplateId;
use crate::output::OutputPaths;
use crate::shutdown::SharedShutdown;

pub mod error;
pub mod fetch;
pub mod scan;

pub use error::CliError;
pub use fetch::FetchArgs;
pub use scan::ScanArgs;

/// Parse and validate the launch cohort size
fn parse_cohort_size(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("cohort size must be at least 1".to_string());
    }
    Ok(value)
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// Marketplace price cross-referencer
#[derive(Parser, Debug)]
#[command(name = "skin-arbitrage")]
#[command(about = "Cross-reference item prices between two skin marketplaces", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Identifiers launched before each cooldown pause
    #[arg(long, global = true, default_value = "100", value_parser = parse_cohort_size)]
    pub cohort_size: usize,

    /// Retries per identifier after the first attempt (range: 0-50)
    #[arg(long, global = true, default_value = "10", value_parser = clap::value_parser!(u32).range(0..=50))]
    pub max_retries: u32,

    /// Stop launching and cancel pending retries after this many seconds
    #[arg(long, global = true)]
    pub deadline_secs: Option<u64>,

    /// Directory for the CSV outputs
    #[arg(long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9090)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,

    /// Hide the progress bar
    #[arg(long, global = true, default_value_t = false)]
    pub no_progress: bool,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the price list, query every mapped item and write the report
    Scan(ScanArgs),

    /// Query a list of identifiers and write their outcomes
    Fetch(FetchArgs),
}

impl Cli {
    /// Batch configuration from the global flags
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig::default()
            .with_cohort_size(self.cohort_size)
            .with_max_retries(self.max_retries)
            .with_deadline(self.deadline_secs.map(Duration::from_secs))
    }

    /// Output file locations
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::new(&self.output_dir)
    }

    /// Run the selected command
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        if let Some(addr) = self.metrics_addr {
            crate::metrics::init_metrics(addr)?;
            info!(%addr, "Prometheus metrics endpoint started");
        }

        match &self.command {
            Commands::Scan(args) => args.execute(self, shutdown).await,
            Commands::Fetch(args) => args.execute(self, shutdown).await,
        }
    }
}

/// Run the batch engine over `identifiers` with the CLI's settings
pub(crate) async fn run_engine<E>(
    cli: &Cli,
    executor: Arc<E>,
    identifiers: &[TemplateId],
    shutdown: SharedShutdown,
) -> BatchReport
where
    E: SearchExecutor + ?Sized + 'static,
{
    let config = cli.batch_config();
    info!(
        identifiers = identifiers.len(),
        cohort_size = config.governor.cohort_size,
        max_retries = config.retry.max_retries,
        "Starting batch"
    );

    let mut scheduler = BatchScheduler::new(executor, config).with_shutdown(shutdown);
    if !cli.no_progress && cli.output_format == OutputFormat::Human {
        scheduler = scheduler.with_progress_bar(create_progress_bar(identifiers.len()));
    }

    let report = scheduler.run(identifiers).await;
    if report.cancelled {
        warn!(
            cancelled = report
                .results
                .iter()
                .filter(|o| matches!(o.failure_reason(), Some(crate::FailureReason::Cancelled)))
                .count(),
            "Batch interrupted before completion"
        );
    }
    report
}

/// Summary printed when a command completes
#[derive(Debug, serde::Serialize)]
pub(crate) struct RunSummary {
    pub command: &'static str,
    pub identifiers: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cooldowns: usize,
    pub elapsed_secs: f64,
    pub cancelled: bool,
    pub outputs: Vec<String>,
}

impl RunSummary {
    pub(crate) fn from_report(command: &'static str, report: &BatchReport) -> Self {
        Self {
            command,
            identifiers: report.results.len(),
            succeeded: report.results.success_count(),
            failed: report.results.failure_count(),
            cooldowns: report.cooldowns.len(),
            elapsed_secs: report.elapsed.as_secs_f64(),
            cancelled: report.cancelled,
            outputs: Vec::new(),
        }
    }

    pub(crate) fn with_output(mut self, path: &std::path::Path) -> Self {
        self.outputs.push(path.display().to_string());
        self
    }

    pub(crate) fn print(&self, format: OutputFormat) -> Result<(), CliError> {
        match format {
            OutputFormat::Json => {
                let line = serde_json::to_string(self)
                    .map_err(|e| CliError::ConfigurationError(format!("summary encoding: {e}")))?;
                println!("{line}");
            }
            OutputFormat::Human => {
                if self.cancelled {
                    eprintln!("\n{} interrupted!", self.command);
                } else {
                    println!("\n{} completed", self.command);
                }
                println!("Elapsed: {:.2}s", self.elapsed_secs);
                println!("Total results: {}", self.identifiers);
                println!("Succeeded: {}", self.succeeded);
                println!("Failed: {}", self.failed);
                println!("Cooldowns: {}", self.cooldowns);
                for output in &self.outputs {
                    println!("Output: {output}");
                }
            }
        }
        Ok(())
    }
}

/// Create progress bar with style
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message("Fetching listings");
    pb
}
