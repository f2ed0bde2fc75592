pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::FixtureConfig;
use commands::{
    config::ConfigArgs, down::DownArgs, endpoint::EndpointArgs, services::ServicesArgs,
    status::StatusArgs, up::UpArgs,
};

/// localstack-fixture - disposable Localstack containers for integration tests
///
/// Starts Localstack in Docker with a chosen set of AWS services, reuses the
/// container on later runs and tells you where each service listens.
#[derive(Parser, Debug)]
#[command(name = "localstack-fixture")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "LOCALSTACK_FIXTURE_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a fixture (or reuse the matching one) and wait until it is ready
    Up(UpArgs),

    /// Stop and remove the matching fixture
    Down(DownArgs),

    /// Show the matching fixture and its port bindings
    Status(StatusArgs),

    /// Resolve a service identifier to a base URL
    Endpoint(EndpointArgs),

    /// List the services Localstack can emulate
    Services(ServicesArgs),

    /// Show the effective configuration or write a template
    Config(ConfigArgs),
}

impl Cli {
    pub fn run(self, config: &FixtureConfig) -> Result<()> {
        match self.command {
            Commands::Up(args) => args.execute(config),
            Commands::Down(args) => args.execute(config),
            Commands::Status(args) => args.execute(config),
            Commands::Endpoint(args) => args.execute(config),
            Commands::Services(args) => args.execute(),
            Commands::Config(args) => args.execute(config, self.config.as_deref()),
        }
    }
}
