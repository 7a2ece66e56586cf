//! Resource provisioner - creates users, keys and repositories with collision retry

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::gitea::{CreateKeyOption, CreateRepoOption, CreateUserOption, EditUserOption};
use crate::domain::provisioning::{DEFAULT_PASSWORD_BYTES, generate_password};
use crate::domain::{
    DomainError, GiteaClient, IdGenerator, Identity, ProvisionedRepo, RepoSpec, SshCredentials,
    TEMPORARY_USER_FULL_NAME,
};

/// Title of the SSH key installed for each user
pub const SSH_KEY_TITLE: &str = "ssh key";

/// Attempts per name before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    pub username_prefix: String,
    pub email_domain: String,
    pub max_attempts: u32,
    pub password_bytes: usize,
}

impl ProvisionerConfig {
    pub fn new(email_domain: impl Into<String>) -> Self {
        Self {
            username_prefix: "u".to_string(),
            email_domain: email_domain.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            password_bytes: DEFAULT_PASSWORD_BYTES,
        }
    }
}

/// Run `create` until it succeeds, retrying only on name collisions
///
/// `create` must draw a fresh candidate name on every call.
async fn with_collision_retry<T, F, Fut>(resource: &str, max_attempts: u32, mut create: F) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match create().await {
            Ok(created) => return Ok(created),
            Err(e) if e.is_conflict() && attempt < max_attempts => {
                warn!(resource = %resource, attempt, max_attempts, error = %e, "Name collision, retrying");
            }
            Err(e) if e.is_conflict() => {
                return Err(DomainError::collision_exhausted(resource, attempt, &e));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Creates the upstream resources of one provisioning run
#[derive(Clone)]
pub struct ResourceProvisioner {
    client: Arc<dyn GiteaClient>,
    ids: Arc<dyn IdGenerator>,
    config: ProvisionerConfig,
}

impl std::fmt::Debug for ResourceProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceProvisioner")
            .field("ids", &self.ids)
            .field("config", &self.config)
            .finish()
    }
}

impl ResourceProvisioner {
    pub fn new(client: Arc<dyn GiteaClient>, ids: Arc<dyn IdGenerator>, config: ProvisionerConfig) -> Self {
        Self { client, ids, config }
    }

    /// Create a temporary user and lock it down
    ///
    /// A user whose restriction fails is deleted again: an unrestricted
    /// temporary account is never handed out or left behind.
    pub async fn create_user(&self) -> Result<Identity, DomainError> {
        let password = generate_password(self.config.password_bytes)?;

        let user = with_collision_retry("user", self.config.max_attempts, || {
            let username = format!("{}{}", self.config.username_prefix, self.ids.generate());
            debug!(username = %username, "Creating user");

            self.client.create_user(CreateUserOption {
                email: format!("{}@{}", username, self.config.email_domain),
                username,
                password: password.clone(),
                full_name: TEMPORARY_USER_FULL_NAME.to_string(),
                must_change_password: false,
                send_notify: false,
            })
        })
        .await?;

        if let Err(e) = self
            .client
            .edit_user(&user.login, EditUserOption::restricted(&user))
            .await
        {
            warn!(username = %user.login, error = %e, "Failed to restrict user, deleting it");
            if let Err(delete_error) = self.client.delete_user(&user.login).await {
                warn!(username = %user.login, error = %delete_error, "Failed to delete unrestricted user");
            }
            return Err(e);
        }

        info!(username = %user.login, "Created user");

        let email = format!("{}@{}", user.login, self.config.email_domain);
        Ok(Identity::new(user.login, email, password))
    }

    /// Install the public half of `credentials` as a read-write key
    pub async fn install_key(&self, identity: &Identity, credentials: &SshCredentials) -> Result<(), DomainError> {
        self.client
            .create_user_public_key(
                identity.username(),
                CreateKeyOption {
                    title: SSH_KEY_TITLE.to_string(),
                    key: credentials.authorized_key().to_string(),
                    read_only: false,
                },
            )
            .await?;

        info!(
            username = %identity.username(),
            fingerprint = %credentials.fingerprint(),
            "Installed SSH key"
        );
        Ok(())
    }

    /// Create one repository per spec, in order, owned by `identity`
    ///
    /// Literal names are attempted once; randomized names are retried with a
    /// fresh token on collision. The first spec that fails aborts the run.
    pub async fn create_repos(
        &self,
        identity: &Identity,
        specs: &[RepoSpec],
    ) -> Result<Vec<ProvisionedRepo>, DomainError> {
        let mut provisioned = Vec::with_capacity(specs.len());

        for spec in specs {
            let pattern = spec.name_pattern();
            let attempts = if pattern.is_randomized() {
                self.config.max_attempts
            } else {
                1
            };
            let resource = format!("repository {}", spec.pattern);

            let repo = with_collision_retry(&resource, attempts, || {
                let name = pattern.resolve(self.ids.as_ref());
                debug!(owner = %identity.username(), name = %name, "Creating repository");

                self.client.create_user_repo(
                    identity.username(),
                    CreateRepoOption {
                        name,
                        private: spec.private,
                    },
                )
            })
            .await?;

            info!(
                owner = %identity.username(),
                name = %repo.name,
                var = %spec.var,
                private = spec.private,
                "Created repository"
            );

            provisioned.push(ProvisionedRepo {
                name: repo.name,
                owner: identity.username().to_string(),
                spec: spec.clone(),
            });
        }

        Ok(provisioned)
    }
}
