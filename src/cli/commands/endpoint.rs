use anyhow::Result;
use clap::Args;

use super::FixtureArgs;
use crate::config::FixtureConfig;
use crate::endpoint::{AwsDefaultResolver, DefaultResolver};

/// Resolve an SDK service identifier against the running fixture
#[derive(Args, Debug)]
pub struct EndpointArgs {
    /// SDK service identifier (e.g. s3, sqs, email, monitoring)
    pub service_id: String,

    /// AWS region used by the fallback policy
    #[arg(short, long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    #[command(flatten)]
    pub fixture: FixtureArgs,
}

impl EndpointArgs {
    pub fn execute(self, config: &FixtureConfig) -> Result<()> {
        let (localstack, services) = self.fixture.controller(config)?;

        let url = match localstack.find(&services)? {
            Some(fixture) => {
                if !fixture.handle().is_running() {
                    tracing::warn!("Container {} is not running", fixture.container_id());
                }
                fixture.resolve(&self.service_id, &self.region, &AwsDefaultResolver)?
            }
            None => {
                tracing::warn!("No running fixture for {}; using AWS endpoints", services.serialized_form());
                AwsDefaultResolver.resolve(&self.service_id, &self.region)?
            }
        };

        println!("{}", url);
        Ok(())
    }
}
