//! Waiting for Localstack to report its services ready
//!
//! Localstack binds its ports before the services behind them are usable, so
//! a TCP probe is not enough. The only reliable signal is the ready marker the
//! process prints once initialization has finished.

use std::time::Duration;

use crate::error::{FixtureError, Result};
use crate::runtime::{ContainerHandle, ContainerRuntime, DEFAULT_CEILING};
use crate::services::ServiceDescriptor;

/// Marker Localstack prints once all requested services are up
pub const DEFAULT_READY_TOKEN: &str = "Ready.";

/// Log based readiness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    token: String,
    ceiling: Duration,
}

impl Default for Readiness {
    fn default() -> Self {
        Self {
            token: DEFAULT_READY_TOKEN.to_string(),
            ceiling: DEFAULT_CEILING,
        }
    }
}

impl Readiness {
    pub fn new(token: impl Into<String>, ceiling: Duration) -> Self {
        Self {
            token: token.into(),
            ceiling,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Block until the container logs contain the ready marker for `service`
    ///
    /// Log fetch failures count as failed attempts. Once the retry ceiling is
    /// exhausted the error names the service.
    pub fn await_ready(
        &self,
        runtime: &dyn ContainerRuntime,
        handle: &ContainerHandle,
        service: &ServiceDescriptor,
    ) -> Result<()> {
        let mut attempt = 0u32;
        tracing::debug!("Waiting for {} in container {}", service, handle.id());

        runtime
            .retry_until(self.ceiling, &mut || {
                attempt += 1;
                let logs = runtime.fetch_logs(handle.id())?;
                if contains_token(&logs, &self.token) {
                    Ok(())
                } else {
                    tracing::trace!("{} not ready (attempt {})", service, attempt);
                    anyhow::bail!("Not Ready")
                }
            })
            .map_err(|source| FixtureError::NotReady {
                service: service.name().to_string(),
                source,
            })?;

        tracing::debug!("{} ready after {} attempt(s)", service, attempt);
        Ok(())
    }
}

/// Whether any trimmed log line contains `token`
pub fn contains_token(logs: &[u8], token: &str) -> bool {
    logs.split(|b| *b == b'\n')
        .map(String::from_utf8_lossy)
        .any(|line| line.trim().contains(token))
}
