use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use localstack_fixture::cli::Cli;
use localstack_fixture::config::FixtureConfig;

fn main() -> Result<()> {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Only warn if the file exists but couldn't be loaded
        if Path::new(".env").exists() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Parse CLI arguments
    let cli = Cli::parse();

    let config = FixtureConfig::load(cli.config.as_deref().map(Path::new))?;

    // Initialize tracing; RUST_LOG wins over the config file
    let default_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli.run(&config)
}
