//! Container runtime capability used by the fixture lifecycle
//!
//! The lifecycle code only talks to Docker through [`ContainerRuntime`], so
//! discovery, readiness, start and destroy can run against a scripted runtime
//! in tests. [`DockerRuntime`] is the real implementation on top of bollard.

#[cfg(feature = "docker")]
mod docker;
#[cfg(test)]
pub(crate) mod mock;
mod retry;

#[cfg(feature = "docker")]
pub use docker::DockerRuntime;
pub use retry::{Backoff, DEFAULT_CEILING};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Live port bindings keyed by container port (e.g. "4572/tcp")
pub type PortBindings = BTreeMap<String, Vec<HostBinding>>;

/// Host side of a published container port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostBinding {
    /// Host IP the port is bound to, as reported by the runtime
    pub host_ip: String,
    /// Host port
    pub host_port: u16,
}

impl HostBinding {
    /// Binding on `host_ip:host_port`
    pub fn new(host_ip: impl Into<String>, host_port: u16) -> Self {
        Self {
            host_ip: host_ip.into(),
            host_port,
        }
    }
}

impl fmt::Display for HostBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = if self.host_ip.is_empty() {
            "localhost"
        } else {
            self.host_ip.as_str()
        };
        if host.contains(':') {
            write!(f, "[{}]:{}", host, self.host_port)
        } else {
            write!(f, "{}:{}", host, self.host_port)
        }
    }
}

/// Options for listing containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Include stopped containers
    pub all: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self { all: true }
    }
}

/// Entry returned when listing containers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    /// Image reference the container was created from
    pub image: String,
}

/// Result of inspecting a single container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDetail {
    pub id: String,
    pub image: String,
    /// Declared environment as `KEY=value` entries
    pub env: Vec<String>,
    pub ports: PortBindings,
    /// Whether the container process is currently running
    pub running: bool,
}

/// What to create when no reusable container exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub repository: String,
    pub tag: String,
    /// Container name; the runtime picks one when absent
    pub name: Option<String>,
    /// Environment as `KEY=value` entries
    pub env: Vec<String>,
    /// Container ports to expose and publish (e.g. "4576/tcp")
    pub exposed_ports: Vec<String>,
}

impl ContainerSpec {
    /// Full image reference (`repository:tag`)
    pub fn image(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}

/// Reference to a running (or reusable) container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerHandle {
    id: String,
    image: String,
    env: Vec<String>,
    ports: PortBindings,
    running: bool,
}

impl ContainerHandle {
    /// Container ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Image reference the container was created from
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Declared environment
    pub fn env(&self) -> &[String] {
        &self.env
    }

    /// Whether the declared environment contains exactly this `KEY=value` entry
    pub fn has_env(&self, entry: &str) -> bool {
        self.env.iter().any(|e| e == entry)
    }

    /// Live port bindings
    pub fn ports(&self) -> &PortBindings {
        &self.ports
    }

    /// First host binding for a container port key such as "4572/tcp"
    pub fn host_binding(&self, port_key: &str) -> Option<&HostBinding> {
        self.ports.get(port_key).and_then(|b| b.first())
    }

    /// Whether the container was running when it was last inspected
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl From<ContainerDetail> for ContainerHandle {
    fn from(detail: ContainerDetail) -> Self {
        Self {
            id: detail.id,
            image: detail.image,
            env: detail.env,
            ports: detail.ports,
            running: detail.running,
        }
    }
}

/// Operations the fixture lifecycle needs from a container engine
///
/// Errors are opaque; callers wrap them into [`crate::FixtureError`].
/// Every call blocks until the engine answers.
pub trait ContainerRuntime: Send + Sync {
    /// List containers known to the engine
    fn list_containers(&self, options: &ListOptions) -> anyhow::Result<Vec<ContainerSummary>>;

    /// Inspect one container
    fn inspect_container(&self, id: &str) -> anyhow::Result<ContainerDetail>;

    /// Create a container from the spec, start it and report its live bindings
    fn create_and_start(&self, spec: &ContainerSpec) -> anyhow::Result<ContainerHandle>;

    /// Combined stdout/stderr of the container up to now
    fn fetch_logs(&self, id: &str) -> anyhow::Result<Vec<u8>>;

    /// Stop and remove the container
    fn purge(&self, handle: &ContainerHandle) -> anyhow::Result<()>;

    /// Run `op` until it succeeds or `ceiling` elapses, returning the last error
    fn retry_until(
        &self,
        ceiling: Duration,
        op: &mut dyn FnMut() -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        Backoff::default().run(ceiling, op)
    }
}
