use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use ca_infra::fs::app_data_dir;
use company_apply::bootstrap::{
    init_tracing_subscriber, load_config_or_default, resolve_app_paths, resolve_config_path,
    wire_dependencies,
};
use company_apply::cli::{self, Cli, CliSubmissionEvents};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.clone(), &app_data_dir()?);
    let config = load_config_or_default(&config_path)?;
    let paths = resolve_app_paths(&config)?;

    // Dropped at the end of main so queued file lines are flushed.
    let _log_guard = init_tracing_subscriber(Some(&paths.logs_dir))?;
    tracing::info!(
        config = %config_path.display(),
        data_dir = %paths.data_dir.display(),
        "company-apply starting"
    );

    let wired = wire_dependencies(&config, &paths, Arc::new(CliSubmissionEvents))?;
    cli::run(cli.command, &wired, &config).await
}
