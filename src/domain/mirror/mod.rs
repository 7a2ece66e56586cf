//! Mirroring of provisioned repositories to an external host

mod hook;

use async_trait::async_trait;

use crate::domain::DomainError;

pub use hook::{MirrorTarget, mirror_hook_script, shell_quote};

#[cfg(test)]
use mockall::automock;

/// Creates the external repository a mirror pushes into
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MirrorProvider: Send + Sync {
    async fn create_repository(&self, org: &str, name: &str, description: &str) -> Result<(), DomainError>;
}
