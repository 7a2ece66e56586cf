//! `newuser`: prestep client for a running provisioning service
//!
//! Waits for the service's version probe, echoes the version document,
//! then forwards stdin as a `/newuser` request and echoes the result.

use std::time::Duration;

use reqwest::{Client, Response};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::domain::DomainError;
use crate::infrastructure::services::{wait_until_ready, ProbeConfig};

use super::error::CliError;
use super::NewUserArgs;

const SERVICE: &str = "provisioner";

/// HTTP client for the provisioning service's two endpoints
#[derive(Debug, Clone)]
pub struct PrestepClient {
    http_client: Client,
    endpoint: String,
    probe: ProbeConfig,
}

impl PrestepClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, DomainError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| DomainError::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            probe: ProbeConfig::prestep(),
        })
    }

    pub fn with_probe(mut self, probe: ProbeConfig) -> Self {
        self.probe = probe;
        self
    }

    /// Retry the version probe until the service accepts connections
    ///
    /// Only transport failures are retried; an error status is final.
    pub async fn version(&self) -> Result<String, DomainError> {
        let url = format!("{}/?get-version=1", self.endpoint);
        let http_client = &self.http_client;
        let url = url.as_str();

        let response = wait_until_ready(&self.probe, "provisioning service", || async move {
            http_client.get(url).send().await.map_err(|e| {
                debug!(url = %url, error = %e, "Service not available yet");
                DomainError::upstream(SERVICE, None, format!("failed to get version information from {}: {}", url, e))
            })
        })
        .await?;

        read_success(response, "get version request").await
    }

    pub async fn new_user(&self, body: Vec<u8>) -> Result<String, DomainError> {
        let url = format!("{}/newuser", self.endpoint);

        let response = self
            .http_client
            .post(&url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| DomainError::upstream(SERVICE, None, format!("failed to post to {}: {}", url, e)))?;

        read_success(response, "newuser request").await
    }
}

async fn read_success(response: Response, what: &str) -> Result<String, DomainError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DomainError::upstream(SERVICE, Some(status.as_u16()), format!("failed to read {} response: {}", what, e)))?;

    if !status.is_success() {
        return Err(DomainError::upstream(
            SERVICE,
            Some(status.as_u16()),
            format!("{} not successful: {}", what, body),
        ));
    }

    Ok(body)
}

pub async fn run(args: NewUserArgs) -> Result<(), CliError> {
    let client = PrestepClient::new(args.endpoint)?;
    let mut stdout = tokio::io::stdout();

    let version = client.version().await?;
    write_out(&mut stdout, &version).await?;

    let mut request = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut request)
        .await
        .map_err(|e| DomainError::internal(format!("failed to read request from stdin: {}", e)))?;

    let result = client.new_user(request).await?;
    write_out(&mut stdout, &result).await?;

    Ok(())
}

async fn write_out(stdout: &mut tokio::io::Stdout, body: &str) -> Result<(), DomainError> {
    let write_error = |e: std::io::Error| DomainError::internal(format!("failed to write output: {}", e));
    stdout.write_all(body.as_bytes()).await.map_err(write_error)?;
    stdout.flush().await.map_err(write_error)
}
