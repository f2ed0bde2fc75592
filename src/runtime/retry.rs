//! Exponential backoff with a total time ceiling

use std::time::{Duration, Instant};

/// Default ceiling for a single readiness wait
pub const DEFAULT_CEILING: Duration = Duration::from_secs(5 * 60);

/// Backoff schedule used by [`super::ContainerRuntime::retry_until`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Sleep after the first failed attempt
    pub initial_interval: Duration,
    /// Upper bound for a single sleep
    pub max_interval: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(15),
        }
    }
}

impl Backoff {
    /// Run `op` until it succeeds or `ceiling` has elapsed
    ///
    /// The operation always runs at least once. When the ceiling is reached
    /// the error of the last attempt is returned.
    pub fn run(
        &self,
        ceiling: Duration,
        op: &mut dyn FnMut() -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let started = Instant::now();
        let mut interval = self.initial_interval;
        let mut attempt = 1u32;

        loop {
            let err = match op() {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            let elapsed = started.elapsed();
            if elapsed >= ceiling {
                return Err(err.context(format!(
                    "gave up after {} attempts in {:?}",
                    attempt, elapsed
                )));
            }

            tracing::trace!("Attempt {} failed: {:#}, retrying in {:?}", attempt, err, interval);
            std::thread::sleep(interval.min(ceiling - elapsed));
            interval = (interval * 2).min(self.max_interval);
            attempt += 1;
        }
    }
}
