//! Docker implementation of [`ContainerRuntime`] on top of bollard

use anyhow::{Context, Result};
use bollard::{
    container::{
        Config, CreateContainerOptions, InspectContainerOptions, ListContainersOptions, LogOutput,
        LogsOptions, RemoveContainerOptions, StartContainerOptions,
    },
    image::CreateImageOptions,
    models::{ContainerInspectResponse, HostConfig, PortMap},
    Docker,
};
use futures_util::StreamExt;
use std::collections::HashMap;
use tokio::runtime::Runtime;

use super::{
    Backoff, ContainerDetail, ContainerHandle, ContainerRuntime, ContainerSpec, ContainerSummary,
    HostBinding, ListOptions, PortBindings,
};

/// Blocking Docker client
///
/// bollard is async; every call here is driven to completion on a private
/// current-thread tokio runtime, so it must not be used from inside another
/// tokio runtime.
pub struct DockerRuntime {
    docker: Docker,
    rt: Runtime,
    backoff: Backoff,
}

impl DockerRuntime {
    /// Connect to the local Docker daemon (honours `DOCKER_HOST`)
    pub fn connect() -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start the Docker I/O runtime")?;

        let docker = {
            let _guard = rt.enter();
            Docker::connect_with_local_defaults()
                .context("Failed to connect to Docker daemon. Is Docker running?")?
        };

        Ok(Self {
            docker,
            rt,
            backoff: Backoff::default(),
        })
    }

    /// Use a different retry schedule for readiness polling
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Check if the daemon answers a ping
    pub fn is_available(&self) -> bool {
        self.rt.block_on(self.docker.ping()).is_ok()
    }

    /// Pull an image if it doesn't exist locally
    async fn ensure_image(&self, repository: &str, tag: &str) -> Result<()> {
        let image = format!("{}:{}", repository, tag);
        if self.docker.inspect_image(&image).await.is_ok() {
            tracing::debug!("Image {} already exists locally", image);
            return Ok(());
        }

        tracing::info!("Pulling image: {}", image);

        let options = CreateImageOptions {
            from_image: repository,
            tag,
            ..Default::default()
        };

        let mut stream = self.docker.create_image(Some(options), None, None);

        while let Some(result) = stream.next().await {
            let info = result.with_context(|| format!("Failed to pull image {}", image))?;
            if let Some(status) = info.status {
                tracing::trace!("Pull: {}", status);
            }
        }

        Ok(())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDetail> {
        let response = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .with_context(|| format!("Failed to inspect container {}", id))?;
        Ok(detail_from_inspect(id, response))
    }

    async fn create(&self, spec: &ContainerSpec) -> Result<ContainerHandle> {
        self.ensure_image(&spec.repository, &spec.tag).await?;

        let exposed_ports: HashMap<String, HashMap<(), ()>> = spec
            .exposed_ports
            .iter()
            .map(|port| (port.clone(), HashMap::new()))
            .collect();

        let config = Config {
            image: Some(spec.image()),
            env: Some(spec.env.clone()),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                // Random host ports; the live bindings are read back below
                publish_all_ports: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = spec.name.as_deref().map(|name| CreateContainerOptions {
            name,
            platform: None,
        });

        let response = self
            .docker
            .create_container(options, config)
            .await
            .context("Failed to create container")?;

        tracing::info!("Created container: {}", response.id);

        self.docker
            .start_container(&response.id, None::<StartContainerOptions<String>>)
            .await
            .context("Failed to start container")?;

        tracing::info!("Started container: {}", response.id);

        Ok(self.inspect(&response.id).await?.into())
    }

    async fn logs(&self, id: &str) -> Result<Vec<u8>> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: "all".to_string(),
            ..Default::default()
        };

        let mut logs = Vec::new();
        let mut stream = self.docker.logs(id, Some(options));

        while let Some(result) = stream.next().await {
            match result.with_context(|| format!("Failed to read logs of {}", id))? {
                LogOutput::StdOut { message }
                | LogOutput::StdErr { message }
                | LogOutput::Console { message } => logs.extend_from_slice(&message),
                LogOutput::StdIn { .. } => {}
            }
        }

        Ok(logs)
    }
}

impl ContainerRuntime for DockerRuntime {
    fn list_containers(&self, options: &ListOptions) -> Result<Vec<ContainerSummary>> {
        let options = ListContainersOptions::<String> {
            all: options.all,
            ..Default::default()
        };

        let containers = self
            .rt
            .block_on(self.docker.list_containers(Some(options)))
            .context("Failed to list containers")?;

        Ok(containers
            .into_iter()
            .filter_map(|c| {
                Some(ContainerSummary {
                    id: c.id?,
                    image: c.image.unwrap_or_default(),
                })
            })
            .collect())
    }

    fn inspect_container(&self, id: &str) -> Result<ContainerDetail> {
        self.rt.block_on(self.inspect(id))
    }

    fn create_and_start(&self, spec: &ContainerSpec) -> Result<ContainerHandle> {
        self.rt.block_on(self.create(spec))
    }

    fn fetch_logs(&self, id: &str) -> Result<Vec<u8>> {
        self.rt.block_on(self.logs(id))
    }

    fn purge(&self, handle: &ContainerHandle) -> Result<()> {
        let options = RemoveContainerOptions {
            force: true,
            v: true, // Remove volumes
            ..Default::default()
        };

        self.rt
            .block_on(self.docker.remove_container(handle.id(), Some(options)))
            .with_context(|| format!("Failed to remove container {}", handle.id()))?;

        tracing::info!("Removed container: {}", handle.id());
        Ok(())
    }

    fn retry_until(
        &self,
        ceiling: std::time::Duration,
        op: &mut dyn FnMut() -> Result<()>,
    ) -> Result<()> {
        self.backoff.run(ceiling, op)
    }
}

fn detail_from_inspect(id: &str, response: ContainerInspectResponse) -> ContainerDetail {
    let config = response.config.unwrap_or_default();
    let ports = response.network_settings.and_then(|n| n.ports);
    let running = response.state.and_then(|s| s.running).unwrap_or(false);

    ContainerDetail {
        id: response.id.unwrap_or_else(|| id.to_string()),
        image: config.image.unwrap_or_default(),
        env: config.env.unwrap_or_default(),
        ports: port_bindings(ports),
        running,
    }
}

/// Convert Docker's port map, skipping entries without a parsable host port
fn port_bindings(map: Option<PortMap>) -> PortBindings {
    map.unwrap_or_default()
        .into_iter()
        .map(|(port, bindings)| {
            let hosts = bindings
                .unwrap_or_default()
                .into_iter()
                .filter_map(|b| {
                    let host_port = b.host_port?.parse().ok()?;
                    Some(HostBinding::new(b.host_ip.unwrap_or_default(), host_port))
                })
                .collect();
            (port, hosts)
        })
        .collect()
}
