//! Start (or reuse) a fixture and print its endpoints

use anyhow::Result;
use clap::Args;
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::FixtureArgs;
use crate::config::FixtureConfig;
use crate::endpoint::AwsDefaultResolver;

/// Start a Localstack fixture or reuse the matching one
#[derive(Args, Debug)]
pub struct UpArgs {
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// Print only the container ID
    #[arg(short, long)]
    pub quiet: bool,
}

impl UpArgs {
    pub fn execute(self, config: &FixtureConfig) -> Result<()> {
        let (localstack, services) = self.fixture.controller(config)?;

        if !self.quiet {
            println!(
                "{} Starting {} with {}",
                Emoji("🚀", ">>"),
                style(localstack.image()).cyan(),
                style(services.serialized_form()).bold()
            );
        }

        let spinner = if self.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} ({elapsed})")?);
        spinner.set_message("Waiting for Localstack to report ready");
        spinner.enable_steady_tick(Duration::from_millis(120));

        let started = localstack.start(services);
        spinner.finish_and_clear();
        let fixture = started?;

        if self.quiet {
            println!("{}", fixture.container_id());
            return Ok(());
        }

        println!(
            "{} Container {} is ready",
            Emoji("✅", "[OK]"),
            style(fixture.container_id()).green()
        );
        println!();
        for (name, url) in fixture.resolver(&AwsDefaultResolver).fixture_urls() {
            println!("  {:<16} {}", style(name).yellow(), url);
        }
        println!();
        println!("Stop it with: localstack-fixture down");

        Ok(())
    }
}
