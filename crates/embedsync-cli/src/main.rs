//! embedsync entry point.
//!
//! Binary name: `embedsync`
//!
//! Resolves the configuration once, sets up tracing, then runs the requested
//! command against the configured database and embedding provider.

mod cli;
mod handler;
mod output;

use anyhow::Context;
use clap::Parser;

use embedsync_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands, verbosity_filter};
use handler::{InvocationContext, InvocationEvent, handler, store_status};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingOptions {
        filter: verbosity_filter(cli.verbose, cli.quiet).to_string(),
        json: cli.json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = dispatch(cli).await;
    shutdown_tracing();
    result
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = cli
        .config
        .into_config(&cli.command)
        .context("invalid configuration")?;

    match cli.command {
        Commands::Run { event } => {
            let event = match event {
                Some(raw) => InvocationEvent(
                    serde_json::from_str(&raw).context("--event is not valid JSON")?,
                ),
                None => InvocationEvent::default(),
            };
            let summary = handler(&event, &InvocationContext::local(), &config).await?;
            if !cli.quiet {
                output::print_run_summary(&summary, &config.tables, cli.json)?;
            }
        }

        Commands::Status => {
            let status = store_status(&config).await?;
            output::print_status(&status, &config.tables, cli.json)?;
        }
    }

    Ok(())
}
