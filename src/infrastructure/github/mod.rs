//! GitHub REST client used to create mirror repositories

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::info;

use crate::domain::{DomainError, MirrorProvider};

const SERVICE: &str = "github";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Serialize)]
struct CreateRepository<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    has_issues: bool,
    has_wiki: bool,
    has_projects: bool,
}

/// Creates organisation repositories with basic auth (user + personal access token)
#[derive(Clone)]
pub struct HttpGithubClient {
    api_url: Url,
    user: String,
    token: String,
    http_client: Client,
}

impl std::fmt::Debug for HttpGithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGithubClient")
            .field("api_url", &self.api_url.as_str())
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl HttpGithubClient {
    pub fn new(
        api_url: &str,
        user: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let api_url = Url::parse(api_url)
            .map_err(|e| DomainError::configuration(format!("invalid GitHub API URL '{}': {}", api_url, e)))?;

        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_url,
            user: user.into(),
            token: token.into(),
            http_client,
        })
    }

    fn org_repos_url(&self, org: &str) -> Result<Url, DomainError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| DomainError::configuration("GitHub API URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["orgs", org, "repos"]);
        Ok(url)
    }
}

#[async_trait]
impl MirrorProvider for HttpGithubClient {
    async fn create_repository(&self, org: &str, name: &str, description: &str) -> Result<(), DomainError> {
        let body = CreateRepository {
            name,
            description,
            private: false,
            has_issues: false,
            has_wiki: false,
            has_projects: false,
        };

        let response = self
            .http_client
            .post(self.org_repos_url(org)?)
            .basic_auth(&self.user, Some(&self.token))
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::timeout(format!("GitHub request timed out: {}", e))
                } else {
                    DomainError::upstream(SERVICE, None, format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            info!(org = %org, repo = %name, "Created mirror repository");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNPROCESSABLE_ENTITY if message.contains("already exists") => {
                Err(DomainError::conflict(message))
            }
            _ => Err(DomainError::upstream(SERVICE, Some(status.as_u16()), message)),
        }
    }
}
