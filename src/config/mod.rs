//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, Credentials, GiteaConfig, KeyscanConfig, LogFormat, LoggingConfig, MirrorConfig,
    ProvisioningConfig, ReaperConfig, ServerConfig, DEFAULT_ORG, DEFAULT_ROOT_URL,
    ENV_CONTRIBUTOR_PASSWORD, ENV_CONTRIBUTOR_USER, ENV_GITHUB_PAT, ENV_GITHUB_USER,
    ENV_ROOT_PASSWORD, ENV_ROOT_USER,
};
