use std::fmt;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Deserializer};

use crate::domain::DomainError;
use crate::domain::provisioning::MIN_PASSWORD_BYTES;

pub const DEFAULT_ROOT_URL: &str = "https://gopher.live";
pub const DEFAULT_ORG: &str = "userguides";

pub const ENV_ROOT_USER: &str = "PLAYWITHGODEV_ROOT_USER";
pub const ENV_ROOT_PASSWORD: &str = "PLAYWITHGODEV_ROOT_PASSWORD";
pub const ENV_CONTRIBUTOR_USER: &str = "PLAYWITHGODEV_CONTRIBUTOR_USER";
pub const ENV_CONTRIBUTOR_PASSWORD: &str = "PLAYWITHGODEV_CONTRIBUTOR_PASSWORD";
pub const ENV_GITHUB_USER: &str = "PLAYWITHGODEV_GITHUB_USER";
pub const ENV_GITHUB_PAT: &str = "PLAYWITHGODEV_GITHUB_PAT";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub gitea: GiteaConfig,
    pub provisioning: ProvisioningConfig,
    pub reaper: ReaperConfig,
    pub mirror: MirrorConfig,
    pub keyscan: KeyscanConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on draining in-flight requests at shutdown
    #[serde(deserialize_with = "deserialize_duration")]
    pub shutdown_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GiteaConfig {
    pub root_url: String,
    /// Organisation whose repositories the reaper manages
    pub org: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    pub username_prefix: String,
    /// Domain of generated email addresses; the Gitea hostname when unset
    pub email_domain: Option<String>,
    pub max_attempts: u32,
    pub password_bytes: usize,
    pub reap_before_provision: bool,
    pub rollback_on_failure: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReaperConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub age: Duration,
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub enabled: bool,
    pub api_url: String,
    pub org: String,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeyscanConfig {
    pub enabled: bool,
    /// Host to scan; the Gitea hostname when unset
    pub host: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for GiteaConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            org: DEFAULT_ORG.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            username_prefix: "u".to_string(),
            email_domain: None,
            max_attempts: 3,
            password_bytes: 30,
            reap_before_provision: false,
            rollback_on_failure: true,
        }
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            age: Duration::from_secs(3 * 3600),
            page_size: 10,
        }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.github.com".to_string(),
            org: DEFAULT_ORG.to_string(),
            host: "github.com".to_string(),
        }
    }
}

impl Default for KeyscanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: None,
        }
    }
}

impl GiteaConfig {
    /// Hostname of the root URL, used in repository locations
    pub fn hostname(&self) -> Result<String, DomainError> {
        let url = Url::parse(&self.root_url)
            .map_err(|e| DomainError::configuration(format!("invalid Gitea root URL '{}': {}", self.root_url, e)))?;

        url.host_str()
            .map(str::to_string)
            .ok_or_else(|| DomainError::configuration(format!("Gitea root URL '{}' has no host", self.root_url)))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that deserialize but cannot be used
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.provisioning.password_bytes < MIN_PASSWORD_BYTES {
            return Err(config::ConfigError::Message(format!(
                "provisioning.password_bytes must be at least {}, got {}",
                MIN_PASSWORD_BYTES, self.provisioning.password_bytes
            )));
        }
        Ok(())
    }
}

/// Username and secret read from the process environment
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    pub fn from_env(user_var: &str, password_var: &str) -> Result<Self, DomainError> {
        Self::from_lookup(user_var, password_var, |name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        user_var: &str,
        password_var: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DomainError> {
        let read = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| DomainError::configuration(format!("environment variable {} is not set", name)))
        };

        Ok(Self {
            username: read(user_var)?,
            password: read(password_var)?,
        })
    }

    /// Site administrator
    pub fn root() -> Result<Self, DomainError> {
        Self::from_env(ENV_ROOT_USER, ENV_ROOT_PASSWORD)
    }

    /// Identity the provisioning service acts as
    pub fn contributor() -> Result<Self, DomainError> {
        Self::from_env(ENV_CONTRIBUTOR_USER, ENV_CONTRIBUTOR_PASSWORD)
    }

    pub fn github() -> Result<Self, DomainError> {
        Self::from_env(ENV_GITHUB_USER, ENV_GITHUB_PAT)
    }
}

/// Accepts humantime strings (`90m`, `3h`, `1h 30m`) or whole seconds
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl serde::de::Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a duration such as \"3h\" or a number of seconds")
        }

        fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Duration, E> {
            humantime::parse_duration(value.trim()).map_err(E::custom)
        }

        fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(value))
        }

        fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<Duration, E> {
            u64::try_from(value)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration must not be negative"))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}
