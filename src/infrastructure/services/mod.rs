//! Infrastructure services

mod bootstrap;
mod mirror;
mod orchestrator;
mod prober;
mod provisioner;
mod reaper;

pub use bootstrap::{OnceSignal, Readiness, bootstrap_client, bootstrap_host_keys, spawn_bootstrap};
pub use mirror::{MirrorService, mirror_name};
pub use orchestrator::{ProvisioningService, ProvisioningSettings};
pub use prober::{ProbeConfig, wait_until_ready};
pub use provisioner::{DEFAULT_MAX_ATTEMPTS, ProvisionerConfig, ResourceProvisioner, SSH_KEY_TITLE};
pub use reaper::{DEFAULT_PAGE_SIZE, ReapReport, Reaper, is_expired};
