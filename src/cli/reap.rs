//! `reap`: delete expired user guide repositories, then temporary users

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{DomainError, GiteaClient};
use crate::infrastructure::services::{ReapReport, Reaper};

use super::context::Context;
use super::error::CliError;
use super::ReapArgs;

pub async fn run(context: &Context, args: ReapArgs) -> Result<(), CliError> {
    let client = Arc::new(context.admin_client()?);
    let age = args.age.unwrap_or(context.config.reaper.age);

    // one clock reading for both passes
    let now = Utc::now();
    let report = reap(client, context, age, now).await?;

    info!(repos = report.repos.len(), users = report.users.len(), "Reap complete");
    Ok(())
}

async fn reap(
    client: Arc<dyn GiteaClient>,
    context: &Context,
    age: Duration,
    now: DateTime<Utc>,
) -> Result<ReapReport, DomainError> {
    Reaper::new(client, context.config.reaper.page_size)
        .reap(&context.config.gitea.org, age, now)
        .await
}
