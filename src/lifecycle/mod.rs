//! Fixture lifecycle: reuse or create a Localstack container, wait for it, tear it down
//!
//! ```text
//!   start(services)
//!        │
//!        ▼
//!   ┌──────────────┐  match   ┌──────────────────────┐
//!   │  discovery   │─────────▶│ reuse container      │──┐
//!   └──────────────┘          └──────────────────────┘  │
//!        │ none                                         │
//!        ▼                                              ▼
//!   ┌──────────────┐          ┌──────────────────────────────┐
//!   │ create+start │─────────▶│ readiness, one service at a  │──▶ Fixture
//!   └──────────────┘          │ time in request order        │
//!                             └──────────────────────────────┘
//! ```
//!
//! The "one fixture per image" check is a plain list-then-create sequence.
//! Two processes starting against an empty Docker host at the same moment
//! can both create a container.

mod discovery;
mod fixture;
mod readiness;

pub use discovery::find;
pub use fixture::Fixture;
pub use readiness::{contains_token, Readiness, DEFAULT_READY_TOKEN};

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::FixtureConfig;
use crate::error::{FixtureError, Result};
use crate::runtime::{ContainerHandle, ContainerRuntime, ContainerSpec};
use crate::services::ServiceSet;

/// Localstack Docker repository
pub const DEFAULT_REPOSITORY: &str = "localstack/localstack";
/// Tag used when none is given
pub const DEFAULT_TAG: &str = "latest";
/// Last Localstack tag this crate was tested against
pub const LAST_TESTED_TAG: &str = "0.9.1";
/// Prefix for names of containers created by this crate
pub const DEFAULT_NAME_PREFIX: &str = "localstack-fixture";

/// Creates, reuses and destroys Localstack fixtures
pub struct Localstack {
    runtime: Arc<dyn ContainerRuntime>,
    repository: String,
    tag: String,
    readiness: Readiness,
    name_prefix: String,
}

impl Localstack {
    /// Controller for `localstack/localstack:latest`
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self {
            runtime,
            repository: DEFAULT_REPOSITORY.to_string(),
            tag: DEFAULT_TAG.to_string(),
            readiness: Readiness::default(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
        }
    }

    /// Controller configured from a loaded config file
    pub fn from_config(runtime: Arc<dyn ContainerRuntime>, config: &FixtureConfig) -> Self {
        Self::new(runtime)
            .with_image(&config.image.repository, &config.image.tag)
            .with_readiness(Readiness::new(
                &config.readiness.token,
                Duration::from_secs(config.readiness.timeout_secs),
            ))
            .with_name_prefix(&config.container.name_prefix)
    }

    /// Use another Localstack image (e.g. a pinned tag or an internal mirror)
    pub fn with_image(mut self, repository: impl Into<String>, tag: impl Into<String>) -> Self {
        self.repository = repository.into();
        self.tag = tag.into();
        self
    }

    /// Set the ready marker and the wait ceiling
    pub fn with_readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }

    /// Set the container name prefix
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Image reference (`repository:tag`)
    pub fn image(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Look up an existing fixture for these services without waiting for readiness
    pub fn find(&self, services: &ServiceSet) -> Result<Option<Fixture>> {
        let handle = discovery::find(self.runtime.as_ref(), services, &self.image())?;
        Ok(handle.map(|h| Fixture::new(Arc::clone(&self.runtime), h, services.clone())))
    }

    /// Reuse the matching container or create one, then wait for every service
    ///
    /// Services are checked one at a time in request order; the first one
    /// that never reports ready aborts the start.
    pub fn start(&self, services: ServiceSet) -> Result<Fixture> {
        let image = self.image();

        let handle = match discovery::find(self.runtime.as_ref(), &services, &image)? {
            Some(handle) => {
                tracing::info!("Reusing Localstack container {}", handle.id());
                check_reusable(&handle, &services)?;
                handle
            }
            None => {
                let spec = self.container_spec(&services);
                tracing::info!("Starting {} with {}", image, services.config_env());
                self.runtime
                    .create_and_start(&spec)
                    .map_err(|source| FixtureError::ProvisionFailed {
                        image: image.clone(),
                        source,
                    })?
            }
        };

        for service in &services {
            self.readiness
                .await_ready(self.runtime.as_ref(), &handle, service)?;
        }

        tracing::info!(
            "Localstack container {} ready with {}",
            handle.id(),
            services.serialized_form()
        );

        Ok(Fixture::new(Arc::clone(&self.runtime), handle, services))
    }

    /// Stop and remove the fixture's container
    pub fn destroy(&self, fixture: Fixture) -> Result<()> {
        fixture.destroy()
    }

    fn container_spec(&self, services: &ServiceSet) -> ContainerSpec {
        let suffix = Uuid::new_v4().simple().to_string();
        ContainerSpec {
            repository: self.repository.clone(),
            tag: self.tag.clone(),
            name: Some(format!("{}-{}", self.name_prefix, &suffix[..8])),
            env: vec![services.config_env(), services.services_env()],
            exposed_ports: services.iter().map(|s| s.port_protocol()).collect(),
        }
    }
}

/// A reused container must be running and publish every requested port
///
/// Logs of a stopped container still hold the ready marker from its last
/// run, so readiness alone cannot tell.
fn check_reusable(handle: &ContainerHandle, services: &ServiceSet) -> Result<()> {
    for service in services {
        let cause = if !handle.is_running() {
            anyhow::anyhow!("container {} is not running", handle.id())
        } else if handle.host_binding(&service.port_protocol()).is_none() {
            anyhow::anyhow!(
                "container {} does not publish {}",
                handle.id(),
                service.port_protocol()
            )
        } else {
            continue;
        };

        tracing::warn!("Cannot reuse container {}: {}", handle.id(), cause);
        return Err(FixtureError::NotReady {
            service: service.name().to_string(),
            source: cause,
        });
    }
    Ok(())
}
