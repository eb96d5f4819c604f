//! Full pipeline: price list, filter, batch search, join

use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::{run_engine, Cli, CliError, RunSummary};
use crate::catalog::TemplateCatalog;
use crate::fetcher::shared_resources::global_http_client;
use crate::fetcher::waxpeer::{PriceListClient, DEFAULT_PRICES_URL};
use crate::fetcher::youpin_http::{YoupinSearchClient, DEFAULT_SEARCH_URL};
use crate::output::csv::{
    read_price_rows, write_outcomes, write_price_rows, write_remote_prices, write_report,
};
use crate::report::filter::DEFAULT_EXCLUDED_KEYWORDS;
use crate::report::{
    build_price_rows, join_report, remote_prices, unique_identifiers, PriceFilter, PriceRow,
};
use crate::shutdown::SharedShutdown;

/// Arguments for the full scan
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// JSON table mapping market names to template ids
    #[arg(long, default_value = "730.json")]
    pub lookup: PathBuf,

    /// Reuse a previously written price list CSV instead of downloading
    #[arg(long)]
    pub price_list: Option<PathBuf>,

    /// Exclusive lower USD bound
    #[arg(long, default_value = "2")]
    pub min_price: Decimal,

    /// Exclusive upper USD bound
    #[arg(long, default_value = "1000")]
    pub max_price: Decimal,

    /// Additional name keyword to exclude (repeatable)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Drop the built-in exclusion keywords
    #[arg(long, default_value_t = false)]
    pub no_default_excludes: bool,

    /// Local currency units per USD; adds a `local_price` report column
    #[arg(long)]
    pub exchange_rate: Option<Decimal>,

    /// Price-list endpoint
    #[arg(long, default_value = DEFAULT_PRICES_URL)]
    pub price_list_url: String,

    /// Search endpoint
    #[arg(long, default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,
}

impl ScanArgs {
    /// Price filter from the flags
    pub fn price_filter(&self) -> Result<PriceFilter, CliError> {
        if self.min_price >= self.max_price {
            return Err(CliError::InvalidArgument(format!(
                "min-price {} must be below max-price {}",
                self.min_price, self.max_price
            )));
        }

        let mut exclude: Vec<String> = if self.no_default_excludes {
            Vec::new()
        } else {
            DEFAULT_EXCLUDED_KEYWORDS.iter().map(|s| s.to_string()).collect()
        };
        exclude.extend(self.exclude.iter().cloned());

        Ok(PriceFilter::new(self.min_price, self.max_price, exclude))
    }

    fn validate(&self) -> Result<(), CliError> {
        if let Some(rate) = self.exchange_rate {
            if rate <= Decimal::ZERO {
                return Err(CliError::InvalidArgument(format!(
                    "exchange rate must be positive, got {rate}"
                )));
            }
        }
        Ok(())
    }

    async fn load_price_rows(&self, filter: &PriceFilter) -> Result<Vec<PriceRow>, CliError> {
        let rows = match &self.price_list {
            Some(path) => read_price_rows(path)?,
            None => {
                let catalog = TemplateCatalog::load(&self.lookup)?;
                info!(entries = catalog.len(), path = %self.lookup.display(), "Lookup table loaded");

                let client = PriceListClient::new(global_http_client()?, &self.price_list_url);
                build_price_rows(client.fetch_items().await?, &catalog)
            }
        };

        let before = rows.len();
        let rows = filter.apply(rows);
        info!(kept = rows.len(), dropped = before - rows.len(), "Price list filtered");
        Ok(rows)
    }

    /// Execute the scan pipeline
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        self.validate()?;
        let filter = self.price_filter()?;
        let paths = cli.output_paths();

        let rows = self.load_price_rows(&filter).await?;
        write_price_rows(paths.price_list(), &rows)?;

        let identifiers = unique_identifiers(&rows);
        if identifiers.len() < rows.len() {
            info!(
                rows = rows.len(),
                identifiers = identifiers.len(),
                "Repeated identifiers are queried once"
            );
        }
        if identifiers.is_empty() {
            warn!("No identifiers left after filtering");
        }

        let executor = Arc::new(YoupinSearchClient::new(global_http_client()?, &self.search_url));
        let report = run_engine(cli, executor, &identifiers, shutdown).await;

        write_remote_prices(paths.remote_prices(), &remote_prices(&report.results))?;
        write_outcomes(paths.outcomes(), &report.results)?;
        let joined = join_report(&rows, &report.results, self.exchange_rate);
        write_report(paths.report(), &joined)?;
        info!(candidates = joined.len(), "Report written");

        RunSummary::from_report("Scan", &report)
            .with_output(&paths.price_list())
            .with_output(&paths.remote_prices())
            .with_output(&paths.outcomes())
            .with_output(&paths.report())
            .print(cli.output_format)
    }
}
