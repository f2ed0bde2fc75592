//! Routing SDK endpoint lookups to the fixture's published ports
//!
//! An identifier the registry knows, that was requested for the fixture and
//! that the container publishes, resolves to `http://<host>:<port>`. Anything
//! else goes to the caller's [`DefaultResolver`], so non-emulated services keep
//! their normal endpoints and a service the fixture was not started with never
//! lands on a stale port.

use crate::error::{FixtureError, Result};
use crate::runtime::ContainerHandle;
use crate::services::{lookup_endpoint_id, ServiceSet};

/// Endpoint policy for services the fixture does not serve
pub trait DefaultResolver {
    /// Base URL for `service_id` in `region`
    fn resolve(&self, service_id: &str, region: &str) -> anyhow::Result<String>;
}

impl<F> DefaultResolver for F
where
    F: Fn(&str, &str) -> anyhow::Result<String>,
{
    fn resolve(&self, service_id: &str, region: &str) -> anyhow::Result<String> {
        self(service_id, region)
    }
}

/// Public AWS endpoints (`https://<service>.<region>.amazonaws.com`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsDefaultResolver;

impl DefaultResolver for AwsDefaultResolver {
    fn resolve(&self, service_id: &str, region: &str) -> anyhow::Result<String> {
        if service_id.is_empty() {
            anyhow::bail!("empty service identifier");
        }
        let url = match service_id {
            // Global services
            "iam" | "route53" => format!("https://{}.amazonaws.com", service_id),
            "sts" if region.is_empty() => "https://sts.amazonaws.com".to_string(),
            _ if region.is_empty() => anyhow::bail!("region required for {}", service_id),
            _ => format!("https://{}.{}.amazonaws.com", service_id, region),
        };
        Ok(url)
    }
}

/// Resolver bound to one fixture
pub struct EndpointResolver<'a> {
    handle: &'a ContainerHandle,
    services: &'a ServiceSet,
    fallback: &'a dyn DefaultResolver,
}

impl<'a> EndpointResolver<'a> {
    pub fn new(
        handle: &'a ContainerHandle,
        services: &'a ServiceSet,
        fallback: &'a dyn DefaultResolver,
    ) -> Self {
        Self {
            handle,
            services,
            fallback,
        }
    }

    /// URL served by the fixture for this identifier, if any
    pub fn fixture_url(&self, service_id: &str) -> Option<String> {
        let descriptor = lookup_endpoint_id(service_id)?;
        if self.services.get_by_port(descriptor.port()).is_none() {
            return None;
        }
        let binding = self.handle.host_binding(&descriptor.port_protocol())?;
        Some(format!("http://{}", binding))
    }

    /// Base URL for `service_id`, falling back to the default policy
    pub fn resolve(&self, service_id: &str, region: &str) -> Result<String> {
        if let Some(url) = self.fixture_url(service_id) {
            tracing::trace!("{} -> {}", service_id, url);
            return Ok(url);
        }

        self.fallback
            .resolve(service_id, region)
            .map_err(|source| FixtureError::Unresolved {
                service: service_id.to_string(),
                region: region.to_string(),
                source,
            })
    }

    /// Every requested service that the container publishes, with its URL
    pub fn fixture_urls(&self) -> Vec<(String, String)> {
        self.services
            .iter()
            .filter_map(|s| {
                self.fixture_url(s.endpoint_id())
                    .map(|url| (s.name().to_string(), url))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ContainerDetail, HostBinding, PortBindings};

    fn handle(ports: &[(&str, &str, u16)]) -> ContainerHandle {
        let mut bindings = PortBindings::new();
        for (key, host, port) in ports {
            bindings
                .entry(key.to_string())
                .or_default()
                .push(HostBinding::new(*host, *port));
        }
        ContainerDetail {
            id: "ls1".to_string(),
            image: "localstack/localstack:latest".to_string(),
            env: Vec::new(),
            ports: bindings,
            running: true,
        }
        .into()
    }

    fn fallback(id: &str, region: &str) -> anyhow::Result<String> {
        Ok(format!("default://{}/{}", id, region))
    }

    #[test]
    fn test_resolve_bound_service() {
        let handle = handle(&[("4572/tcp", "1.0.0.0", 9572)]);
        let services = ServiceSet::from_names(["s3"]).unwrap();
        let resolver = EndpointResolver::new(&handle, &services, &fallback);

        assert_eq!(resolver.resolve("s3", "us-east-1").unwrap(), "http://1.0.0.0:9572");
    }

    #[test]
    fn test_resolve_uses_endpoint_id() {
        let handle = handle(&[("4579/tcp", "127.0.0.1", 5000), ("4582/tcp", "127.0.0.1", 5001)]);
        let services = ServiceSet::from_names(["ses", "cloudwatch"]).unwrap();
        let resolver = EndpointResolver::new(&handle, &services, &fallback);

        assert_eq!(resolver.resolve("email", "eu-west-1").unwrap(), "http://127.0.0.1:5000");
        assert_eq!(resolver.resolve("monitoring", "eu-west-1").unwrap(), "http://127.0.0.1:5001");
        // Localstack names are not SDK identifiers
        assert_eq!(resolver.resolve("ses", "eu-west-1").unwrap(), "default://ses/eu-west-1");
    }

    #[test]
    fn test_not_requested_service_falls_back() {
        let handle = handle(&[("4572/tcp", "1.0.0.0", 9572), ("4576/tcp", "1.0.0.0", 9576)]);
        let services = ServiceSet::from_names(["s3"]).unwrap();
        let resolver = EndpointResolver::new(&handle, &services, &fallback);

        assert_eq!(resolver.fixture_url("sqs"), None);
        assert_eq!(resolver.resolve("sqs", "us-east-1").unwrap(), "default://sqs/us-east-1");
    }

    #[test]
    fn test_requested_but_unbound_falls_back() {
        let handle = handle(&[]);
        let services = ServiceSet::from_names(["sqs"]).unwrap();
        let resolver = EndpointResolver::new(&handle, &services, &fallback);

        assert_eq!(resolver.resolve("sqs", "us-east-1").unwrap(), "default://sqs/us-east-1");
    }

    #[test]
    fn test_unknown_service_falls_back() {
        let handle = handle(&[("4572/tcp", "1.0.0.0", 9572)]);
        let services = ServiceSet::from_names(["s3"]).unwrap();
        let resolver = EndpointResolver::new(&handle, &services, &fallback);

        assert_eq!(resolver.resolve("ec2", "us-west-2").unwrap(), "default://ec2/us-west-2");
    }

    #[test]
    fn test_fallback_error_is_unresolved() {
        let handle = handle(&[]);
        let services = ServiceSet::new();
        let failing = |_: &str, _: &str| -> anyhow::Result<String> { anyhow::bail!("no endpoint") };
        let resolver = EndpointResolver::new(&handle, &services, &failing);

        let err = resolver.resolve("ec2", "mars-1").unwrap_err();
        assert!(matches!(
            err,
            FixtureError::Unresolved { ref service, ref region, .. } if service == "ec2" && region == "mars-1"
        ));
    }

    #[test]
    fn test_fixture_urls() {
        let handle = handle(&[("4572/tcp", "", 9572), ("4576/tcp", "0.0.0.0", 9576)]);
        let services = ServiceSet::from_names(["sqs", "sns", "s3"]).unwrap();
        let resolver = EndpointResolver::new(&handle, &services, &AwsDefaultResolver);

        assert_eq!(
            resolver.fixture_urls(),
            vec![
                ("sqs".to_string(), "http://0.0.0.0:9576".to_string()),
                ("s3".to_string(), "http://localhost:9572".to_string()),
            ]
        );
    }

    #[test]
    fn test_aws_default_resolver() {
        let aws = AwsDefaultResolver;
        assert_eq!(aws.resolve("ec2", "us-east-1").unwrap(), "https://ec2.us-east-1.amazonaws.com");
        assert_eq!(aws.resolve("iam", "us-east-1").unwrap(), "https://iam.amazonaws.com");
        assert_eq!(aws.resolve("sts", "").unwrap(), "https://sts.amazonaws.com");
        assert_eq!(aws.resolve("sts", "eu-west-1").unwrap(), "https://sts.eu-west-1.amazonaws.com");
        assert!(aws.resolve("ec2", "").is_err());
        assert!(aws.resolve("", "us-east-1").is_err());
    }
}
