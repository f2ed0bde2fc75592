//! Ordered collection of requested services

use serde::Serialize;
use std::str::FromStr;

use super::{lookup, ServiceDescriptor};
use crate::error::{FixtureError, Result};

/// Environment variable carrying the serialized service set; discovery matches on it
pub const CONFIG_ENV_KEY: &str = "CONFIG";

/// Environment variable Localstack reads to decide which services to start
pub const SERVICES_ENV_KEY: &str = "SERVICES";

const SEPARATOR: &str = ",";

/// The services requested for one fixture
///
/// Insertion order is significant: it drives the readiness poll order and the
/// serialized form. Two sets holding the same services in a different order
/// serialize differently and therefore do not match the same container.
/// Duplicates are not rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServiceSet {
    services: Vec<ServiceDescriptor>,
}

impl ServiceSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from registry names, keeping their order
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.add(lookup(name.as_ref().trim())?);
        }
        Ok(set)
    }

    /// Append a descriptor
    pub fn add(&mut self, descriptor: ServiceDescriptor) {
        self.services.push(descriptor);
    }

    /// Append a descriptor, builder style
    pub fn with(mut self, descriptor: ServiceDescriptor) -> Self {
        self.add(descriptor);
        self
    }

    /// Whether any element has the given name
    pub fn contains(&self, name: &str) -> bool {
        self.services.iter().any(|s| s.name() == name)
    }

    /// First element listening on the given internal port
    pub fn get_by_port(&self, port: u16) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.port() == port)
    }

    /// `name:port` pairs joined by `,`, in insertion order
    pub fn serialized_form(&self) -> String {
        self.services
            .iter()
            .map(ServiceDescriptor::name_port)
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// The `CONFIG=` entry declared on the container and matched during discovery
    pub fn config_env(&self) -> String {
        format!("{}={}", CONFIG_ENV_KEY, self.serialized_form())
    }

    /// The `SERVICES=` entry telling Localstack what to start
    pub fn services_env(&self) -> String {
        let names: Vec<&str> = self.services.iter().map(|s| s.name()).collect();
        format!("{}={}", SERVICES_ENV_KEY, names.join(SEPARATOR))
    }

    /// Elements ordered by name; presentation only, never used for matching
    pub fn sorted_by_name(&self) -> Vec<ServiceDescriptor> {
        let mut sorted = self.services.clone();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));
        sorted
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, ServiceDescriptor> {
        self.services.iter()
    }

    /// Number of elements, duplicates included
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no service was requested
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl FromStr for ServiceSet {
    type Err = FixtureError;

    /// Parse a comma separated list of service names
    fn from_str(s: &str) -> Result<Self> {
        Self::from_names(s.split(SEPARATOR).filter(|n| !n.trim().is_empty()))
    }
}

impl<'a> IntoIterator for &'a ServiceSet {
    type Item = &'a ServiceDescriptor;
    type IntoIter = std::slice::Iter<'a, ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<ServiceDescriptor> for ServiceSet {
    fn from_iter<T: IntoIterator<Item = ServiceDescriptor>>(iter: T) -> Self {
        Self {
            services: iter.into_iter().collect(),
        }
    }
}
