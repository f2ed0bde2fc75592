//! Registry of the AWS services Localstack can emulate
//!
//! The catalog is closed and compiled in: every supported service has exactly
//! one descriptor with a fixed internal container port. Callers obtain
//! descriptors through [`lookup`] and never build them by hand.

mod set;

pub use set::{ServiceSet, CONFIG_ENV_KEY, SERVICES_ENV_KEY};

use serde::Serialize;
use std::fmt;

use crate::error::{FixtureError, Result};

/// A single emulated service: name, transport protocol and internal port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ServiceDescriptor {
    name: &'static str,
    endpoint_id: &'static str,
    protocol: &'static str,
    port: u16,
}

impl ServiceDescriptor {
    const fn tcp(name: &'static str, endpoint_id: &'static str, port: u16) -> Self {
        Self {
            name,
            endpoint_id,
            protocol: "tcp",
            port,
        }
    }

    /// Service name as understood by Localstack (e.g. "s3")
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Identifier used by AWS SDK endpoint resolution (e.g. "email" for ses)
    pub fn endpoint_id(&self) -> &'static str {
        self.endpoint_id
    }

    /// Network protocol used for communication
    pub fn protocol(&self) -> &'static str {
        self.protocol
    }

    /// Port the service listens on inside the container
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Port key used by Docker (e.g. "4576/tcp")
    pub fn port_protocol(&self) -> String {
        format!("{}/{}", self.port, self.protocol)
    }

    /// Element of the serialized service set (e.g. "sqs:4576")
    pub fn name_port(&self) -> String {
        format!("{}:{}", self.name, self.port)
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

const CATALOG: &[ServiceDescriptor] = &[
    ServiceDescriptor::tcp("apigateway", "apigateway", 4567),
    ServiceDescriptor::tcp("kinesis", "kinesis", 4568),
    ServiceDescriptor::tcp("dynamodb", "dynamodb", 4569),
    ServiceDescriptor::tcp("dynamodbstreams", "streams.dynamodb", 4570),
    ServiceDescriptor::tcp("es", "es", 4571),
    ServiceDescriptor::tcp("s3", "s3", 4572),
    ServiceDescriptor::tcp("firehose", "firehose", 4573),
    ServiceDescriptor::tcp("lambda", "lambda", 4574),
    ServiceDescriptor::tcp("sns", "sns", 4575),
    ServiceDescriptor::tcp("sqs", "sqs", 4576),
    ServiceDescriptor::tcp("redshift", "redshift", 4577),
    ServiceDescriptor::tcp("ses", "email", 4579),
    ServiceDescriptor::tcp("route53", "route53", 4580),
    ServiceDescriptor::tcp("cloudformation", "cloudformation", 4581),
    ServiceDescriptor::tcp("cloudwatch", "monitoring", 4582),
    ServiceDescriptor::tcp("ssm", "ssm", 4583),
    ServiceDescriptor::tcp("secretsmanager", "secretsmanager", 4584),
    ServiceDescriptor::tcp("stepfunctions", "states", 4585),
    ServiceDescriptor::tcp("logs", "logs", 4586),
    ServiceDescriptor::tcp("sts", "sts", 4592),
    ServiceDescriptor::tcp("iam", "iam", 4593),
];

/// Look up a service by its Localstack name
pub fn lookup(name: &str) -> Result<ServiceDescriptor> {
    CATALOG
        .iter()
        .find(|s| s.name == name)
        .copied()
        .ok_or_else(|| FixtureError::UnknownService(name.to_string()))
}

/// Look up a service by the identifier an SDK uses for endpoint resolution
pub fn lookup_endpoint_id(id: &str) -> Option<ServiceDescriptor> {
    CATALOG.iter().find(|s| s.endpoint_id == id).copied()
}

/// All supported services, in port order
pub fn all() -> &'static [ServiceDescriptor] {
    CATALOG
}
