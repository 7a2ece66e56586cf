//! Age-based reaping of provisioned users and repositories

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::domain::{DomainError, GiteaClient, GiteaRepo, GiteaUser, TEMPORARY_USER_FULL_NAME};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on full listing scans within one reap
const MAX_SCANS: usize = 8;

/// What a reap pass deleted, as `owner/name` and login names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReapReport {
    pub repos: Vec<String>,
    pub users: Vec<String>,
}

/// Whether a resource created at `created` has outlived `age` at `now`
///
/// Strictly older: a resource exactly `age` old survives.
pub fn is_expired(created: DateTime<Utc>, now: DateTime<Utc>, age: chrono::Duration) -> bool {
    now.signed_duration_since(created) > age
}

fn to_chrono(age: Duration) -> Result<chrono::Duration, DomainError> {
    chrono::Duration::from_std(age)
        .map_err(|_| DomainError::validation(format!("reap age {} is out of range", humantime::format_duration(age))))
}

fn repo_key(repo: &GiteaRepo) -> String {
    format!("{}/{}", repo.owner.login, repo.name)
}

/// Nothing from the previous scan went missing except what this pass deleted
fn settled(previous: &HashSet<String>, seen: &HashSet<String>, tried: &HashSet<String>) -> bool {
    previous.iter().all(|key| seen.contains(key) || tried.contains(key))
}

#[derive(Clone)]
pub struct Reaper {
    client: Arc<dyn GiteaClient>,
    page_size: u32,
}

impl std::fmt::Debug for Reaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reaper").field("page_size", &self.page_size).finish()
    }
}

impl Reaper {
    pub fn new(client: Arc<dyn GiteaClient>, page_size: u32) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
        }
    }

    /// Read every page of a listing, stopping at the first short page
    async fn scan<T, F, Fut>(&self, list: F) -> Result<Vec<T>, DomainError>
    where
        F: Fn(u32, u32) -> Fut,
        Fut: Future<Output = Result<Vec<T>, DomainError>>,
    {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let batch = list(page, self.page_size).await?;
            let count = batch.len();
            items.extend(batch);
            if count < self.page_size as usize {
                return Ok(items);
            }
            page += 1;
        }
    }

    /// Delete the organisation's repositories older than `age`
    ///
    /// Page offsets shift whenever anyone deletes, so the listing is read
    /// again from the first page until a full scan turns up no new victim
    /// and lost nothing besides what this pass removed.
    #[instrument(skip(self, age), fields(age = %humantime::format_duration(age)))]
    pub async fn reap_repos(&self, org: &str, age: Duration, now: DateTime<Utc>) -> Result<Vec<String>, DomainError> {
        let max_age = to_chrono(age)?;
        let client = &self.client;

        let mut tried: HashSet<String> = HashSet::new();
        let mut previous: Option<HashSet<String>> = None;
        let mut deleted = Vec::new();

        for _ in 0..MAX_SCANS {
            let listing = self
                .scan(move |page, limit| client.list_org_repos(org, page, limit))
                .await?;
            let seen: HashSet<String> = listing.iter().map(repo_key).collect();
            let victims: Vec<GiteaRepo> = listing
                .into_iter()
                .filter(|repo| {
                    !tried.contains(&repo_key(repo))
                        && repo.owner.login.eq_ignore_ascii_case(org)
                        && is_expired(repo.created_at, now, max_age)
                })
                .collect();

            if victims.is_empty() && previous.as_ref().is_some_and(|prev| settled(prev, &seen, &tried)) {
                return Ok(deleted);
            }

            for repo in victims {
                tried.insert(repo_key(&repo));
                let observed_age = now.signed_duration_since(repo.created_at);
                match self.client.delete_repo(&repo.owner.login, &repo.name).await {
                    Ok(()) => {
                        info!(
                            owner = %repo.owner.login,
                            name = %repo.name,
                            age_secs = observed_age.num_seconds(),
                            "Deleted repository"
                        );
                        deleted.push(repo_key(&repo));
                    }
                    Err(DomainError::NotFound { .. }) => {
                        debug!(owner = %repo.owner.login, name = %repo.name, "Repository already gone");
                    }
                    Err(e) => return Err(e),
                }
            }
            previous = Some(seen);
        }

        warn!(scans = MAX_SCANS, "Repository listing kept changing, stopping");
        Ok(deleted)
    }

    /// Delete temporary users older than `age`, together with their repositories
    ///
    /// Only accounts carrying the temporary-user marker are considered. The
    /// listing is rescanned the same way as for repositories.
    #[instrument(skip(self, age), fields(age = %humantime::format_duration(age)))]
    pub async fn reap_users(&self, age: Duration, now: DateTime<Utc>) -> Result<Vec<String>, DomainError> {
        let max_age = to_chrono(age)?;
        let client = &self.client;

        let mut tried: HashSet<String> = HashSet::new();
        let mut previous: Option<HashSet<String>> = None;
        let mut deleted = Vec::new();

        for _ in 0..MAX_SCANS {
            let listing = self
                .scan(move |page, limit| client.list_users(page, limit))
                .await?;
            let seen: HashSet<String> = listing.iter().map(|user| user.login.clone()).collect();
            let victims: Vec<GiteaUser> = listing
                .into_iter()
                .filter(|user| {
                    !tried.contains(&user.login)
                        && user.full_name == TEMPORARY_USER_FULL_NAME
                        && is_expired(user.created, now, max_age)
                })
                .collect();

            if victims.is_empty() && previous.as_ref().is_some_and(|prev| settled(prev, &seen, &tried)) {
                return Ok(deleted);
            }

            for user in victims {
                tried.insert(user.login.clone());
                let observed_age = now.signed_duration_since(user.created);
                match self.client.delete_user(&user.login).await {
                    Ok(()) => {
                        info!(
                            username = %user.login,
                            age_secs = observed_age.num_seconds(),
                            "Deleted user"
                        );
                        deleted.push(user.login);
                    }
                    Err(DomainError::NotFound { .. }) => {
                        debug!(username = %user.login, "User already gone");
                    }
                    Err(e) => return Err(e),
                }
            }
            previous = Some(seen);
        }

        warn!(scans = MAX_SCANS, "User listing kept changing, stopping");
        Ok(deleted)
    }

    /// Repositories first, then users, against a single `now`
    pub async fn reap(&self, org: &str, age: Duration, now: DateTime<Utc>) -> Result<ReapReport, DomainError> {
        let repos = self.reap_repos(org, age, now).await?;
        let users = self.reap_users(age, now).await?;

        info!(repos = repos.len(), users = users.len(), "Reap pass complete");
        Ok(ReapReport { repos, users })
    }
}
