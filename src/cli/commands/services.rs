use anyhow::{Context, Result};
use clap::Args;
use console::style;

use crate::services;

/// List the services Localstack can emulate
#[derive(Args, Debug)]
pub struct ServicesArgs {
    /// Print the registry as JSON
    #[arg(long)]
    pub json: bool,
}

impl ServicesArgs {
    pub fn execute(self) -> Result<()> {
        if self.json {
            let json = serde_json::to_string_pretty(services::all())
                .context("Failed to serialize service registry")?;
            println!("{}", json);
            return Ok(());
        }

        println!(
            "{:<18} {:<20} {}",
            style("SERVICE").bold(),
            style("ENDPOINT ID").bold(),
            style("PORT").bold()
        );
        for service in services::all() {
            println!(
                "{:<18} {:<20} {}",
                style(service.name()).cyan(),
                service.endpoint_id(),
                service.port_protocol()
            );
        }
        Ok(())
    }
}
