//! Startup bootstrap: client handshake and host key scan
//!
//! Both steps run as background tasks while the listener already accepts
//! connections. Each one completes a [`OnceSignal`]; handlers that need
//! either piece of state wait on [`Readiness::wait`].

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::{DomainError, GiteaClient};
use crate::infrastructure::keyscan::HostKeyScanner;

use super::prober::{ProbeConfig, wait_until_ready};

/// A value published once and observable by any number of waiters
///
/// Waiting after the value was published returns immediately. Later
/// publications are ignored.
#[derive(Debug)]
pub struct OnceSignal<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T> Default for OnceSignal<T> {
    fn default() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }
}

impl<T: Clone> OnceSignal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `value`; returns false if a value was already published
    pub fn fire(&self, value: T) -> bool {
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(value);
            true
        })
    }

    pub fn get(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    pub fn is_fired(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub async fn wait(&self) -> T {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(value) = rx.borrow_and_update().clone() {
                return value;
            }
            // the sender lives in self, so the channel cannot close under us
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

/// Completion state of the startup bootstrap
#[derive(Debug, Default)]
pub struct Readiness {
    client: OnceSignal<()>,
    host_keys: OnceSignal<Option<Arc<str>>>,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_client_ready(&self) -> bool {
        self.client.fire(())
    }

    /// Record the scanned host keys; `None` when scanning is disabled
    pub fn set_host_keys(&self, keys: Option<String>) -> bool {
        self.host_keys.fire(keys.map(Arc::from))
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_fired() && self.host_keys.is_fired()
    }

    /// Wait for both signals and return the host keys
    pub async fn wait(&self) -> Option<Arc<str>> {
        let ((), host_keys) = tokio::join!(self.client.wait(), self.host_keys.wait());
        host_keys
    }
}

/// Probe the serving client until its first authenticated call succeeds
pub async fn bootstrap_client(
    client: Arc<dyn GiteaClient>,
    probe: ProbeConfig,
    readiness: &Readiness,
) -> Result<(), DomainError> {
    let version = wait_until_ready(&probe, "gitea client", || client.server_version()).await?;

    info!(version = %version.version, "Gitea client ready");
    readiness.mark_client_ready();
    Ok(())
}

pub async fn bootstrap_host_keys(
    scanner: Option<Arc<dyn HostKeyScanner>>,
    readiness: &Readiness,
) -> Result<(), DomainError> {
    let keys = match scanner {
        Some(scanner) => {
            let keys = scanner.scan().await?;
            info!(lines = keys.lines().count(), "Host key scan complete");
            Some(keys)
        }
        None => None,
    };

    readiness.set_host_keys(keys);
    Ok(())
}

/// Run both bootstrap steps concurrently in the background
///
/// A failing step reports its error on `fatal`; the signal it owns never
/// fires.
pub fn spawn_bootstrap(
    client: Arc<dyn GiteaClient>,
    scanner: Option<Arc<dyn HostKeyScanner>>,
    probe: ProbeConfig,
    readiness: Arc<Readiness>,
    fatal: mpsc::UnboundedSender<DomainError>,
) -> Vec<JoinHandle<()>> {
    let client_task = {
        let readiness = Arc::clone(&readiness);
        let fatal = fatal.clone();
        tokio::spawn(async move {
            if let Err(e) = bootstrap_client(client, probe, &readiness).await {
                error!(error = %e, "Gitea client bootstrap failed");
                let _ = fatal.send(e);
            }
        })
    };

    let keyscan_task = tokio::spawn(async move {
        if let Err(e) = bootstrap_host_keys(scanner, &readiness).await {
            error!(error = %e, "Host key scan failed");
            let _ = fatal.send(e);
        }
    });

    vec![client_task, keyscan_task]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::gitea::InMemoryGitea;
    use crate::infrastructure::keyscan::MockHostKeyScanner;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_after_fire_returns_immediately() {
        let signal = OnceSignal::new();
        assert!(signal.fire(7));
        assert_eq!(signal.wait().await, 7);
        assert_eq!(signal.get(), Some(7));
    }

    #[tokio::test]
    async fn test_second_fire_is_ignored() {
        let signal = OnceSignal::new();
        assert!(signal.fire("first"));
        assert!(!signal.fire("second"));
        assert_eq!(signal.wait().await, "first");
    }

    #[tokio::test]
    async fn test_many_waiters_released_together() {
        let signal = Arc::new(OnceSignal::<u32>::new());
        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let signal = Arc::clone(&signal);
                tokio::spawn(async move { signal.wait().await })
            })
            .collect();

        tokio::task::yield_now().await;
        signal.fire(42);

        for waiter in waiters {
            assert_eq!(waiter.await.unwrap(), 42);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_readiness_needs_both_signals() {
        let readiness = Arc::new(Readiness::new());
        let waiter = {
            let readiness = Arc::clone(&readiness);
            tokio::spawn(async move { readiness.wait().await })
        };

        readiness.mark_client_ready();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());
        assert!(!readiness.is_ready());

        readiness.set_host_keys(Some("|1|abc ssh-ed25519 AAAA".to_string()));
        let keys = waiter.await.unwrap();
        assert_eq!(keys.as_deref(), Some("|1|abc ssh-ed25519 AAAA"));
        assert!(readiness.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_bootstrap_retries_until_ready() {
        let gitea = Arc::new(InMemoryGitea::new());
        gitea.fail_version_checks(3);
        let readiness = Readiness::new();

        bootstrap_client(gitea.clone(), ProbeConfig::client_bootstrap(), &readiness)
            .await
            .unwrap();

        assert_eq!(gitea.version_calls(), 4);
        assert!(readiness.client.is_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_bootstrap_reports_failure() {
        let gitea = Arc::new(InMemoryGitea::new());
        gitea.fail_version_checks(u32::MAX);
        let mut scanner = MockHostKeyScanner::new();
        scanner
            .expect_scan()
            .returning(|| Ok("|1|x ssh-ed25519 AAAA".to_string()));

        let readiness = Arc::new(Readiness::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_bootstrap(
            gitea,
            Some(Arc::new(scanner)),
            ProbeConfig::client_bootstrap(),
            Arc::clone(&readiness),
            tx,
        );

        let err = rx.recv().await.unwrap();
        assert!(matches!(err, DomainError::Upstream { .. }));
        assert!(!readiness.is_ready());
        assert!(readiness.host_keys.is_fired());
    }

    #[tokio::test]
    async fn test_disabled_scan_still_signals() {
        let readiness = Readiness::new();
        bootstrap_host_keys(None, &readiness).await.unwrap();
        assert_eq!(readiness.host_keys.get(), Some(None));
    }
}
