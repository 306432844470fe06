//! LogCentral tool CLI

use anyhow::Result;
use clap::Parser;
use logcentral_lib::StructuredLogger;
use logtool::cli::{Cli, Commands};
use logtool::commands::{self, catalog, watch};
use logtool::config::Config;
use logtool::output::print_error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let settings = cli.settings(&config);
    StructuredLogger::new("tool").log_startup(env!("CARGO_PKG_VERSION"), &settings.endpoint);

    let (client, records) = commands::tool_client(&settings)?;

    let result = match cli.command {
        Commands::Watch {
            tags,
            components,
            filter_name,
            limit,
        } => {
            let options = watch::WatchOptions::new(filter_name, tags, components, limit);
            watch::watch(&client, records, options, settings.format).await
        }
        Commands::Tags => catalog::show_tags(&client, settings.format).await,
        Commands::Components => catalog::show_components(&client, settings.format).await,
    };

    if let Err(e) = result {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}
