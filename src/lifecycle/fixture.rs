//! Handle to a running Localstack fixture

use std::sync::Arc;

use crate::endpoint::{DefaultResolver, EndpointResolver};
use crate::error::{FixtureError, Result};
use crate::runtime::{ContainerHandle, ContainerRuntime};
use crate::services::ServiceSet;

/// One Localstack container plus the services it was configured with
///
/// Pass it explicitly to the tests that need it. [`Fixture::destroy`]
/// consumes the handle, so nothing can resolve against a purged container.
/// Dropping a fixture leaves the container running for the next test run.
pub struct Fixture {
    runtime: Arc<dyn ContainerRuntime>,
    handle: ContainerHandle,
    services: ServiceSet,
    destroyed: bool,
}

impl Fixture {
    pub(crate) fn new(
        runtime: Arc<dyn ContainerRuntime>,
        handle: ContainerHandle,
        services: ServiceSet,
    ) -> Self {
        Self {
            runtime,
            handle,
            services,
            destroyed: false,
        }
    }

    /// Container ID
    pub fn container_id(&self) -> &str {
        self.handle.id()
    }

    /// Underlying container handle
    pub fn handle(&self) -> &ContainerHandle {
        &self.handle
    }

    /// Services requested for this fixture, in request order
    pub fn services(&self) -> &ServiceSet {
        &self.services
    }

    /// Endpoint resolver routing Localstack services to this container
    pub fn resolver<'a>(&'a self, fallback: &'a dyn DefaultResolver) -> EndpointResolver<'a> {
        EndpointResolver::new(&self.handle, &self.services, fallback)
    }

    /// Resolve a service identifier to a base URL
    pub fn resolve(
        &self,
        service_id: &str,
        region: &str,
        fallback: &dyn DefaultResolver,
    ) -> Result<String> {
        self.resolver(fallback).resolve(service_id, region)
    }

    /// Stop and remove the container
    ///
    /// Calling this for a container that is already gone surfaces the
    /// runtime's error.
    pub fn destroy(mut self) -> Result<()> {
        tracing::info!("Destroying fixture container {}", self.handle.id());
        self.destroyed = true;
        self.runtime
            .purge(&self.handle)
            .map_err(|source| FixtureError::DestroyFailed {
                container_id: self.handle.id().to_string(),
                source,
            })
    }
}

impl std::fmt::Debug for Fixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fixture")
            .field("container_id", &self.handle.id())
            .field("services", &self.services.serialized_form())
            .finish()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        if !self.destroyed {
            tracing::debug!(
                "Fixture {} dropped without destroy(); container stays up for reuse",
                self.handle.id()
            );
        }
    }
}
