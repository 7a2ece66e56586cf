//! Readiness probing with bounded exponential backoff

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::DomainError;

/// Backoff policy for a readiness probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeConfig {
    pub initial_delay: Duration,
    pub factor: f64,
    pub max_wait: Duration,
}

impl ProbeConfig {
    pub fn new(initial_delay: Duration, factor: f64, max_wait: Duration) -> Self {
        Self {
            initial_delay,
            factor,
            max_wait,
        }
    }

    /// Waiting for the Gitea API to come up after the server starts
    pub fn api_startup(max_wait: Duration) -> Self {
        Self::new(Duration::from_millis(10), 1.5, max_wait)
    }

    /// First authenticated handshake of the serving client
    pub fn client_bootstrap() -> Self {
        Self::new(Duration::from_millis(100), 1.5, Duration::from_secs(5))
    }

    /// Waiting for the provisioning service from a guide prestep
    pub fn prestep() -> Self {
        Self::new(Duration::from_millis(10), 1.5, Duration::from_secs(30))
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        delay.mul_f64(self.factor.max(1.0))
    }
}

/// Run `check` until it succeeds or `config.max_wait` has elapsed
///
/// Each failure is followed by a sleep that starts at `initial_delay` and
/// grows by `factor`, never past the deadline. An attempt still running at
/// the deadline is abandoned. On timeout the last failure is returned.
pub async fn wait_until_ready<F, Fut, T>(config: &ProbeConfig, what: &str, mut check: F) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let start = Instant::now();
    let deadline = start + config.max_wait;
    let mut delay = config.initial_delay;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let remaining = deadline.saturating_duration_since(Instant::now());

        let error = match tokio::time::timeout(remaining, check()).await {
            Ok(Ok(value)) => {
                if attempt > 1 {
                    info!(target_name = %what, attempt, elapsed_ms = start.elapsed().as_millis() as u64, "Ready");
                }
                return Ok(value);
            }
            Ok(Err(e)) => e,
            Err(_) => DomainError::timeout(format!(
                "{} not ready after {}",
                what,
                humantime::format_duration(config.max_wait)
            )),
        };

        let now = Instant::now();
        if now >= deadline {
            warn!(target_name = %what, attempt, error = %error, "Gave up waiting");
            return Err(error);
        }

        let sleep = delay.min(deadline - now);
        debug!(
            target_name = %what,
            attempt,
            delay_ms = sleep.as_millis() as u64,
            error = %error,
            "Not ready, retrying"
        );
        tokio::time::sleep(sleep).await;
        delay = config.next_delay(delay);
    }
}
