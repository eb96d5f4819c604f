//! Batch-only command over an identifier file

use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::{run_engine, Cli, CliError, RunSummary};
use crate::fetcher::shared_resources::global_http_client;
use crate::fetcher::youpin_http::{YoupinSearchClient, DEFAULT_SEARCH_URL};
use crate::identifier::{parse_identifier_list, TemplateId};
use crate::output::csv::{write_outcomes, write_remote_prices};
use crate::report::remote_prices;
use crate::shutdown::SharedShutdown;

/// Arguments for fetching an explicit identifier list
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// File with one template id per line (`#` starts a comment)
    #[arg(long)]
    pub ids: PathBuf,

    /// Search endpoint
    #[arg(long, default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,
}

/// Drop repeated identifiers, keeping first occurrences in order
fn dedup_identifiers(identifiers: Vec<TemplateId>) -> Vec<TemplateId> {
    let mut seen = HashSet::with_capacity(identifiers.len());
    identifiers
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

impl FetchArgs {
    /// Read and parse the identifier file
    pub fn load_identifiers(&self) -> Result<Vec<TemplateId>, CliError> {
        let raw = std::fs::read_to_string(&self.ids).map_err(|e| {
            CliError::InvalidArgument(format!("cannot read {}: {e}", self.ids.display()))
        })?;
        let parsed = parse_identifier_list(&raw)?;
        let total = parsed.len();
        let identifiers = dedup_identifiers(parsed);
        info!(
            path = %self.ids.display(),
            identifiers = identifiers.len(),
            duplicates = total - identifiers.len(),
            "Identifier list loaded"
        );
        Ok(identifiers)
    }

    /// Execute the batch and write its outcomes
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let identifiers = self.load_identifiers()?;
        let paths = cli.output_paths();

        let executor = Arc::new(YoupinSearchClient::new(global_http_client()?, &self.search_url));
        let report = run_engine(cli, executor, &identifiers, shutdown).await;

        write_outcomes(paths.outcomes(), &report.results)?;
        write_remote_prices(paths.remote_prices(), &remote_prices(&report.results))?;

        RunSummary::from_report("Fetch", &report)
            .with_output(&paths.outcomes())
            .with_output(&paths.remote_prices())
            .print(cli.output_format)
    }
}
