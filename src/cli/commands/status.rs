use anyhow::{Context, Result};
use clap::Args;
use console::{style, Emoji};
use serde::Serialize;
use std::collections::BTreeMap;

use super::FixtureArgs;
use crate::config::FixtureConfig;
use crate::endpoint::AwsDefaultResolver;
use crate::lifecycle::Fixture;
use crate::runtime::PortBindings;

/// Show whether a matching fixture exists
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub fixture: FixtureArgs,

    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable status
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub image: String,
    pub config: String,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    pub endpoints: BTreeMap<String, String>,
    pub ports: PortBindings,
}

impl StatusReport {
    fn new(image: String, config: String, fixture: Option<&Fixture>) -> Self {
        let Some(fixture) = fixture else {
            return Self {
                image,
                config,
                running: false,
                container_id: None,
                endpoints: BTreeMap::new(),
                ports: PortBindings::new(),
            };
        };

        Self {
            image,
            config,
            running: fixture.handle().is_running(),
            container_id: Some(fixture.container_id().to_string()),
            endpoints: fixture
                .resolver(&AwsDefaultResolver)
                .fixture_urls()
                .into_iter()
                .collect(),
            ports: fixture.handle().ports().clone(),
        }
    }
}

impl StatusArgs {
    pub fn execute(self, config: &FixtureConfig) -> Result<()> {
        let (localstack, services) = self.fixture.controller(config)?;
        let fixture = localstack.find(&services)?;
        let report = StatusReport::new(localstack.image(), services.config_env(), fixture.as_ref());

        if self.json {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize status")?;
            println!("{}", json);
            return Ok(());
        }

        println!("{} Localstack fixture status\n", Emoji("🐳", ""));
        println!("Image:     {}", report.image);
        println!("Config:    {}", report.config);

        match report.container_id {
            Some(ref id) => {
                if report.running {
                    println!("Container: {} {}", style("running").green(), id);
                } else {
                    println!("Container: {} {}", style("stopped").red(), id);
                    println!("\n   Remove it with 'localstack-fixture down', then run 'localstack-fixture up'.");
                }
                if !report.endpoints.is_empty() {
                    println!("\nEndpoints:");
                    for (name, url) in &report.endpoints {
                        println!("  {:<16} {}", style(name).yellow(), url);
                    }
                }
            }
            None => {
                println!("Container: {}", style("none").dim());
                println!("\n   Run 'localstack-fixture up' to start one.");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_without_fixture() {
        let report = StatusReport::new(
            "localstack/localstack:latest".to_string(),
            "CONFIG=s3:4572".to_string(),
            None,
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["running"], false);
        assert_eq!(json["config"], "CONFIG=s3:4572");
        assert!(json.get("container_id").is_none());
        assert_eq!(json["endpoints"], serde_json::json!({}));
    }

    #[test]
    fn test_report_stopped_fixture() {
        use crate::runtime::mock::MockRuntime;
        use crate::runtime::{ContainerDetail, ContainerRuntime};
        use crate::services::ServiceSet;
        use std::sync::Arc;

        let runtime = Arc::new(MockRuntime::new().with_container(ContainerDetail {
            id: "stale".to_string(),
            image: "localstack/localstack:latest".to_string(),
            env: vec!["CONFIG=sqs:4576".to_string()],
            ports: PortBindings::new(),
            running: false,
        }));
        let services = ServiceSet::from_names(["sqs"]).unwrap();
        let localstack = crate::lifecycle::Localstack::new(runtime as Arc<dyn ContainerRuntime>);
        let fixture = localstack.find(&services).unwrap();

        let report = StatusReport::new(localstack.image(), services.config_env(), fixture.as_ref());
        assert!(!report.running);
        assert_eq!(report.container_id.as_deref(), Some("stale"));
        assert!(report.endpoints.is_empty());
    }
}
