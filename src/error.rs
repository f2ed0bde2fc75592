//! Error types for fixture lifecycle operations

use thiserror::Error;

/// Result type for fixture operations
pub type Result<T> = std::result::Result<T, FixtureError>;

/// Errors that can occur while provisioning, reusing or tearing down a fixture
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Service name is not part of the compiled-in registry
    #[error("Unknown Localstack service: {0}")]
    UnknownService(String),

    /// The container runtime could not be reached or rejected a list/inspect/logs call
    #[error("Container runtime unavailable while trying to {action}")]
    RuntimeUnavailable {
        /// Operation that was being attempted
        action: String,
        #[source]
        source: anyhow::Error,
    },

    /// A container from the same image exists but was started with other services
    #[error(
        "Container {container_id} runs {image} with a different service configuration; \
         only one fixture per image is supported"
    )]
    ConflictingFixture {
        /// Conflicting container
        container_id: String,
        /// Image reference shared by both fixtures
        image: String,
    },

    /// The runtime refused to create or start the container
    #[error("Could not provision {image}")]
    ProvisionFailed {
        /// Image reference that was requested
        image: String,
        #[source]
        source: anyhow::Error,
    },

    /// The readiness token never showed up in the container logs
    #[error("Service {service} did not report ready")]
    NotReady {
        /// Service that failed the readiness check
        service: String,
        #[source]
        source: anyhow::Error,
    },

    /// The runtime refused to purge the container
    #[error("Could not destroy container {container_id}")]
    DestroyFailed {
        /// Container that could not be removed
        container_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The fallback resolution policy could not produce an endpoint
    #[error("No endpoint for {service} in {region}")]
    Unresolved {
        /// Requested service identifier
        service: String,
        /// Requested region
        region: String,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration error
    #[error("Fixture configuration error: {reason}")]
    Config {
        /// Reason for error
        reason: String,
    },
}

impl FixtureError {
    pub(crate) fn runtime(action: impl Into<String>, source: anyhow::Error) -> Self {
        Self::RuntimeUnavailable {
            action: action.into(),
            source,
        }
    }

    /// Name of the service that failed readiness, if this is a readiness failure
    pub fn not_ready_service(&self) -> Option<&str> {
        match self {
            Self::NotReady { service, .. } => Some(service),
            _ => None,
        }
    }
}
