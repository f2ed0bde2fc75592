pub mod config;
pub mod down;
pub mod endpoint;
pub mod services;
pub mod status;
pub mod up;

use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use crate::config::FixtureConfig;
use crate::lifecycle::Localstack;
use crate::runtime::ContainerRuntime;
use crate::services::ServiceSet;

/// Options selecting which fixture a command operates on
#[derive(Args, Debug, Clone, Default)]
pub struct FixtureArgs {
    /// Comma-separated services, in readiness order (defaults to the config file)
    #[arg(short, long, value_delimiter = ',')]
    pub services: Vec<String>,

    /// Localstack image repository
    #[arg(long)]
    pub repository: Option<String>,

    /// Localstack image tag
    #[arg(long)]
    pub tag: Option<String>,
}

impl FixtureArgs {
    /// Config with command-line overrides applied
    pub fn merge(&self, config: &FixtureConfig) -> FixtureConfig {
        let mut merged = config.clone();
        if !self.services.is_empty() {
            merged.services = self.services.clone();
        }
        if let Some(ref repository) = self.repository {
            merged.image.repository = repository.clone();
        }
        if let Some(ref tag) = self.tag {
            merged.image.tag = tag.clone();
        }
        merged
    }

    /// Controller and service set for this invocation
    pub fn controller(&self, config: &FixtureConfig) -> Result<(Localstack, ServiceSet)> {
        let merged = self.merge(config);
        merged.validate()?;
        let services = merged.service_set()?;
        let runtime = connect_runtime()?;
        Ok((Localstack::from_config(runtime, &merged), services))
    }
}

/// Connect to the local Docker daemon
#[cfg(feature = "docker")]
pub fn connect_runtime() -> Result<Arc<dyn ContainerRuntime>> {
    use crate::runtime::DockerRuntime;

    let runtime = DockerRuntime::connect()?;
    if !runtime.is_available() {
        anyhow::bail!(
            "Docker is not available. Please ensure Docker is installed and running.\n\
             On macOS: Start Docker Desktop\n\
             On Linux: Run 'sudo systemctl start docker'"
        );
    }
    Ok(Arc::new(runtime))
}

#[cfg(not(feature = "docker"))]
pub fn connect_runtime() -> Result<Arc<dyn ContainerRuntime>> {
    anyhow::bail!(
        "Docker support is not enabled. Rebuild with --features docker:\n\
         cargo build --features docker"
    )
}
