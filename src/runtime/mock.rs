//! Scripted in-memory runtime for lifecycle tests

use anyhow::anyhow;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::{
    ContainerDetail, ContainerHandle, ContainerRuntime, ContainerSpec, ContainerSummary,
    ListOptions, PortBindings,
};

/// A call observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List,
    Inspect(String),
    Create(ContainerSpec),
    FetchLogs(String),
    Purge(String),
    Retry,
}

/// Runtime double recording every call and replaying scripted answers
pub(crate) struct MockRuntime {
    containers: Mutex<Vec<ContainerDetail>>,
    calls: Mutex<Vec<Call>>,
    log_script: Mutex<VecDeque<anyhow::Result<Vec<u8>>>>,
    default_logs: Vec<u8>,
    created_ports: PortBindings,
    list_error: Option<String>,
    inspect_error: Option<String>,
    create_error: Option<String>,
    purge_error: Option<String>,
    retry_attempts: usize,
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self {
            containers: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            log_script: Mutex::new(VecDeque::new()),
            default_logs: b"Starting mock infrastructure\nReady.\n".to_vec(),
            created_ports: PortBindings::new(),
            list_error: None,
            inspect_error: None,
            create_error: None,
            purge_error: None,
            retry_attempts: 3,
        }
    }
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-existing container
    pub fn with_container(self, detail: ContainerDetail) -> Self {
        self.containers.lock().unwrap().push(detail);
        self
    }

    /// Logs returned once the scripted answers run out
    pub fn with_default_logs(mut self, logs: &str) -> Self {
        self.default_logs = logs.as_bytes().to_vec();
        self
    }

    /// Next answer for `fetch_logs`
    pub fn then_logs(self, logs: &str) -> Self {
        self.log_script
            .lock()
            .unwrap()
            .push_back(Ok(logs.as_bytes().to_vec()));
        self
    }

    /// Next `fetch_logs` call fails
    pub fn then_logs_error(self, message: &str) -> Self {
        self.log_script
            .lock()
            .unwrap()
            .push_back(Err(anyhow!(message.to_string())));
        self
    }

    /// Bindings reported for containers created by the mock
    pub fn with_created_ports(mut self, ports: PortBindings) -> Self {
        self.created_ports = ports;
        self
    }

    pub fn fail_list(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    pub fn fail_inspect(mut self, message: &str) -> Self {
        self.inspect_error = Some(message.to_string());
        self
    }

    pub fn fail_create(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    pub fn fail_purge(mut self, message: &str) -> Self {
        self.purge_error = Some(message.to_string());
        self
    }

    /// How many times `retry_until` runs the operation before giving up
    pub fn with_retry_attempts(mut self, attempts: usize) -> Self {
        self.retry_attempts = attempts;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn container_count(&self) -> usize {
        self.containers.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ContainerRuntime for MockRuntime {
    fn list_containers(&self, _options: &ListOptions) -> anyhow::Result<Vec<ContainerSummary>> {
        self.record(Call::List);
        if let Some(ref message) = self.list_error {
            return Err(anyhow!(message.clone()));
        }
        Ok(self
            .containers
            .lock()
            .unwrap()
            .iter()
            .map(|c| ContainerSummary {
                id: c.id.clone(),
                image: c.image.clone(),
            })
            .collect())
    }

    fn inspect_container(&self, id: &str) -> anyhow::Result<ContainerDetail> {
        self.record(Call::Inspect(id.to_string()));
        if let Some(ref message) = self.inspect_error {
            return Err(anyhow!(message.clone()));
        }
        self.containers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("No such container: {}", id))
    }

    fn create_and_start(&self, spec: &ContainerSpec) -> anyhow::Result<ContainerHandle> {
        self.record(Call::Create(spec.clone()));
        if let Some(ref message) = self.create_error {
            return Err(anyhow!(message.clone()));
        }
        let mut containers = self.containers.lock().unwrap();
        let detail = ContainerDetail {
            id: format!("mock-{}", containers.len() + 1),
            image: spec.image(),
            env: spec.env.clone(),
            ports: self.created_ports.clone(),
            running: true,
        };
        containers.push(detail.clone());
        Ok(detail.into())
    }

    fn fetch_logs(&self, id: &str) -> anyhow::Result<Vec<u8>> {
        self.record(Call::FetchLogs(id.to_string()));
        match self.log_script.lock().unwrap().pop_front() {
            Some(answer) => answer,
            None => Ok(self.default_logs.clone()),
        }
    }

    fn purge(&self, handle: &ContainerHandle) -> anyhow::Result<()> {
        self.record(Call::Purge(handle.id().to_string()));
        if let Some(ref message) = self.purge_error {
            return Err(anyhow!(message.clone()));
        }
        let mut containers = self.containers.lock().unwrap();
        let before = containers.len();
        containers.retain(|c| c.id != handle.id());
        if containers.len() == before {
            return Err(anyhow!("No such container: {}", handle.id()));
        }
        Ok(())
    }

    fn retry_until(
        &self,
        _ceiling: Duration,
        op: &mut dyn FnMut() -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        self.record(Call::Retry);
        let mut last = anyhow!("retry budget is zero");
        for _ in 0..self.retry_attempts {
            match op() {
                Ok(()) => return Ok(()),
                Err(e) => last = e,
            }
        }
        Err(last)
    }
}
