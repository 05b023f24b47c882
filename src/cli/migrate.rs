//! Migration command handler

use std::sync::Arc;

use crate::cli::Cli;
use crate::client::GitHubClient;
use crate::clock::SystemClock;
use crate::error::Result;
use crate::migrator::Migrator;
use crate::output;

/// Run one migration and print its report.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = cli.into_config()?;

    let source = Arc::new(GitHubClient::new(
        config.source_credential.clone(),
        Some(&cli.api_url),
    )?);
    let target = Arc::new(GitHubClient::new(
        config.target_credential.clone(),
        Some(&cli.api_url),
    )?);

    let report = Migrator::new(config, source, target, Arc::new(SystemClock))
        .run()
        .await?;

    output::print_report(&report, cli.format)
}
