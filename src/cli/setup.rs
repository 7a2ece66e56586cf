//! `wait` and `pre`: bring a fresh Gitea instance into service

use std::time::Duration;

use tracing::info;

use crate::domain::gitea::{CreateOrgOption, Organization, ServerVersion};
use crate::domain::{DomainError, GiteaClient};
use crate::infrastructure::services::{wait_until_ready, ProbeConfig};

use super::context::Context;
use super::error::CliError;
use super::WaitArgs;

pub async fn wait(context: &Context, args: WaitArgs) -> Result<(), CliError> {
    let client = context.admin_client()?;
    wait_for_server(&client, args.wait).await?;
    Ok(())
}

pub async fn pre(context: &Context, args: WaitArgs) -> Result<(), CliError> {
    let client = context.admin_client()?;
    wait_for_server(&client, args.wait).await?;
    create_managed_org(&client, &context.config.gitea.org).await?;
    Ok(())
}

pub async fn wait_for_server(client: &dyn GiteaClient, max_wait: Duration) -> Result<ServerVersion, DomainError> {
    let version = wait_until_ready(&ProbeConfig::api_startup(max_wait), "gitea server", || client.server_version()).await?;
    info!(version = %version.version, "Gitea server available");
    Ok(version)
}

/// The organisation provisioned repositories are mirrored and reaped under
pub async fn create_managed_org(client: &dyn GiteaClient, org: &str) -> Result<Organization, DomainError> {
    let organization = client
        .create_org(CreateOrgOption {
            username: org.to_string(),
            visibility: "private".to_string(),
        })
        .await?;

    info!(org = %organization.name, "Created organisation");
    Ok(organization)
}
