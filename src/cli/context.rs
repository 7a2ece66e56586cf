//! Per-invocation context shared by the subcommands

use crate::config::{AppConfig, Credentials};
use crate::domain::DomainError;
use crate::infrastructure::gitea::{GiteaClientConfig, HttpGiteaClient};
use crate::infrastructure::logging::init_logging;

use super::error::CliError;

/// Configuration after CLI overrides, plus the derived Gitea hostname
#[derive(Debug, Clone)]
pub struct Context {
    pub config: AppConfig,
    pub hostname: String,
}

impl Context {
    /// Load `.env`, layered configuration and the root URL override, then
    /// initialise logging
    pub fn load(root_url: Option<&str>, debug: bool) -> Result<Self, CliError> {
        dotenvy::dotenv().ok();

        let config = AppConfig::load()
            .map_err(|e| DomainError::configuration(format!("failed to load configuration: {}", e)))?;

        let context = Self::from_config(config, root_url)?;
        init_logging(&context.config.logging, debug);
        Ok(context)
    }

    pub fn from_config(mut config: AppConfig, root_url: Option<&str>) -> Result<Self, DomainError> {
        if let Some(root_url) = root_url {
            config.gitea.root_url = root_url.to_string();
        }

        let hostname = config.gitea.hostname()?;
        Ok(Self { config, hostname })
    }

    /// Client acting as `credentials` against the configured root URL
    pub fn gitea_client(&self, credentials: Credentials) -> Result<HttpGiteaClient, DomainError> {
        let config = GiteaClientConfig::new(&self.config.gitea.root_url, credentials.username, credentials.password)
            .with_timeout(self.config.gitea.timeout);
        HttpGiteaClient::new(config)
    }

    /// Client acting as the site administrator
    pub fn admin_client(&self) -> Result<HttpGiteaClient, DomainError> {
        self.gitea_client(Credentials::root()?)
    }
}
