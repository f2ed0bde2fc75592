//! Disposable Localstack containers for integration tests
//!
//! [`Localstack::start`] reuses the container already running for the same
//! service set or creates one, and blocks until every requested service has
//! reported ready. The returned [`Fixture`] routes SDK endpoint lookups to the
//! container's published ports.
//!
//! ```no_run
//! use std::sync::Arc;
//! use localstack_fixture::{AwsDefaultResolver, DockerRuntime, Localstack, ServiceSet};
//!
//! # fn main() -> anyhow::Result<()> {
//! let localstack = Localstack::new(Arc::new(DockerRuntime::connect()?));
//! let fixture = localstack.start(ServiceSet::from_names(["sqs", "s3"])?)?;
//! let sqs = fixture.resolve("sqs", "us-east-1", &AwsDefaultResolver)?;
//! # let _ = sqs;
//! fixture.destroy()?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod lifecycle;
pub mod runtime;
pub mod services;

pub use config::FixtureConfig;
pub use endpoint::{AwsDefaultResolver, DefaultResolver, EndpointResolver};
pub use error::{FixtureError, Result};
pub use lifecycle::{Fixture, Localstack, Readiness};
#[cfg(feature = "docker")]
pub use runtime::DockerRuntime;
pub use runtime::{ContainerHandle, ContainerRuntime, ContainerSpec};
pub use services::{ServiceDescriptor, ServiceSet};
