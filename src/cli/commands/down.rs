use anyhow::Result;
use clap::Args;
use console::{style, Emoji};

use super::FixtureArgs;
use crate::config::FixtureConfig;

/// Destroy the fixture matching the selected services
#[derive(Args, Debug)]
pub struct DownArgs {
    #[command(flatten)]
    pub fixture: FixtureArgs,
}

impl DownArgs {
    pub fn execute(self, config: &FixtureConfig) -> Result<()> {
        let (localstack, services) = self.fixture.controller(config)?;

        let Some(fixture) = localstack.find(&services)? else {
            println!(
                "No {} fixture running with {}",
                localstack.image(),
                services.serialized_form()
            );
            return Ok(());
        };

        let id = fixture.container_id().to_string();
        localstack.destroy(fixture)?;
        println!("{} Removed container {}", Emoji("🧹", "[OK]"), style(id).green());

        Ok(())
    }
}
