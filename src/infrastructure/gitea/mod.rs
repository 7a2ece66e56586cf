//! Gitea API clients

mod http_client;
#[cfg(test)]
pub mod in_memory;

pub use http_client::{GiteaClientConfig, HttpGiteaClient};
#[cfg(test)]
pub use in_memory::InMemoryGitea;
