//! Gitea REST client over reqwest

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::gitea::{
    AccessToken, CreateAccessTokenOption, CreateKeyOption, CreateOrgOption, CreateRepoOption,
    CreateUserOption, EditGitHookOption, EditUserOption, GitHook, GiteaClient, GiteaRepo,
    GiteaUser, Organization, PublicKey, ServerVersion,
};
use crate::domain::DomainError;

const SERVICE: &str = "gitea";

/// Connection settings for one authenticated Gitea identity
#[derive(Clone)]
pub struct GiteaClientConfig {
    pub root_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for GiteaClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaClientConfig")
            .field("root_url", &self.root_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GiteaClientConfig {
    pub fn new(root_url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            username: username.into(),
            password: password.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gitea API client authenticating with HTTP basic auth
#[derive(Debug, Clone)]
pub struct HttpGiteaClient {
    config: GiteaClientConfig,
    base: Url,
    http_client: Client,
}

impl HttpGiteaClient {
    pub fn new(config: GiteaClientConfig) -> Result<Self, DomainError> {
        let base = Url::parse(&config.root_url).map_err(|e| {
            DomainError::configuration(format!("invalid Gitea root URL '{}': {}", config.root_url, e))
        })?;

        if base.cannot_be_a_base() {
            return Err(DomainError::configuration(format!(
                "Gitea root URL '{}' cannot carry API paths",
                config.root_url
            )));
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            base,
            http_client,
        })
    }

    /// Same server, different identity
    pub fn with_credentials(&self, username: impl Into<String>, password: impl Into<String>) -> Self {
        let mut config = self.config.clone();
        config.username = username.into();
        config.password = password.into();

        Self {
            config,
            base: self.base.clone(),
            http_client: self.http_client.clone(),
        }
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        debug!(method = %method, url = %url, "Gitea request");

        self.http_client
            .request(method, url)
            .basic_auth(&self.config.username, Some(&self.config.password))
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, DomainError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::timeout(format!("Gitea request timed out: {}", e))
            } else {
                DomainError::upstream(SERVICE, None, format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DomainError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::upstream(SERVICE, None, format!("failed to parse response: {}", e)))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), DomainError> {
        self.send(request).await.map(|_| ())
    }
}

/// Map a non-2xx response to a domain error
///
/// Gitea reports an existing user as 422 and an existing repository or
/// organisation as 409; both are name collisions.
fn classify_failure(status: StatusCode, body: String) -> DomainError {
    let message = body.trim().to_string();

    match status {
        StatusCode::CONFLICT => DomainError::conflict(message),
        StatusCode::UNPROCESSABLE_ENTITY if message.to_lowercase().contains("already exist") => {
            DomainError::conflict(message)
        }
        StatusCode::NOT_FOUND => DomainError::not_found(message),
        _ => DomainError::upstream(SERVICE, Some(status.as_u16()), message),
    }
}

fn page_query(page: u32, limit: u32) -> [(&'static str, String); 2] {
    [("page", page.to_string()), ("limit", limit.to_string())]
}

#[async_trait]
impl GiteaClient for HttpGiteaClient {
    async fn server_version(&self) -> Result<ServerVersion, DomainError> {
        self.send_json(self.request(Method::GET, &["version"])).await
    }

    async fn create_user(&self, option: CreateUserOption) -> Result<GiteaUser, DomainError> {
        self.send_json(self.request(Method::POST, &["admin", "users"]).json(&option))
            .await
    }

    async fn edit_user(&self, username: &str, option: EditUserOption) -> Result<GiteaUser, DomainError> {
        self.send_json(
            self.request(Method::PATCH, &["admin", "users", username])
                .json(&option),
        )
        .await
    }

    async fn delete_user(&self, username: &str) -> Result<(), DomainError> {
        self.send_empty(
            self.request(Method::DELETE, &["admin", "users", username])
                .query(&[("purge", "true")]),
        )
        .await
    }

    async fn list_users(&self, page: u32, limit: u32) -> Result<Vec<GiteaUser>, DomainError> {
        self.send_json(
            self.request(Method::GET, &["admin", "users"])
                .query(&page_query(page, limit)),
        )
        .await
    }

    async fn create_user_public_key(
        &self,
        username: &str,
        option: CreateKeyOption,
    ) -> Result<PublicKey, DomainError> {
        self.send_json(
            self.request(Method::POST, &["admin", "users", username, "keys"])
                .json(&option),
        )
        .await
    }

    async fn create_user_repo(&self, owner: &str, option: CreateRepoOption) -> Result<GiteaRepo, DomainError> {
        self.send_json(
            self.request(Method::POST, &["admin", "users", owner, "repos"])
                .json(&option),
        )
        .await
    }

    async fn list_org_repos(&self, org: &str, page: u32, limit: u32) -> Result<Vec<GiteaRepo>, DomainError> {
        self.send_json(
            self.request(Method::GET, &["orgs", org, "repos"])
                .query(&page_query(page, limit)),
        )
        .await
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> Result<(), DomainError> {
        self.send_empty(self.request(Method::DELETE, &["repos", owner, name]))
            .await
    }

    async fn create_org(&self, option: CreateOrgOption) -> Result<Organization, DomainError> {
        self.send_json(self.request(Method::POST, &["orgs"]).json(&option))
            .await
    }

    async fn edit_git_hook(
        &self,
        owner: &str,
        repo: &str,
        hook: GitHook,
        option: EditGitHookOption,
    ) -> Result<(), DomainError> {
        self.send_empty(
            self.request(Method::PATCH, &["repos", owner, repo, "hooks", "git", hook.as_str()])
                .json(&option),
        )
        .await
    }

    async fn create_access_token(
        &self,
        username: &str,
        option: CreateAccessTokenOption,
    ) -> Result<AccessToken, DomainError> {
        self.send_json(
            self.request(Method::POST, &["users", username, "tokens"])
                .json(&option),
        )
        .await
    }
}
