//! SSH host key scanning via `ssh-keyscan`

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Produces `known_hosts` lines for the git server
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HostKeyScanner: Send + Sync {
    async fn scan(&self) -> Result<String, DomainError>;
}

/// Runs `ssh-keyscan -H <host>`
#[derive(Debug, Clone)]
pub struct SshKeyscan {
    program: String,
    host: String,
}

impl SshKeyscan {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            program: "ssh-keyscan".to_string(),
            host: host.into(),
        }
    }

    /// Run a different executable with the same arguments
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl HostKeyScanner for SshKeyscan {
    async fn scan(&self) -> Result<String, DomainError> {
        let command = format!("{} -H {}", self.program, self.host);
        debug!(command = %command, "Scanning host keys");

        let output = Command::new(&self.program)
            .arg("-H")
            .arg(&self.host)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::process(&command, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::process(
                &command,
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
