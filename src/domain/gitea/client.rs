//! Gitea client trait

use async_trait::async_trait;

use super::types::{
    AccessToken, CreateAccessTokenOption, CreateKeyOption, CreateOrgOption, CreateRepoOption,
    CreateUserOption, EditGitHookOption, EditUserOption, GitHook, GiteaRepo, GiteaUser,
    Organization, PublicKey, ServerVersion,
};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Operations this service performs against the Gitea API
///
/// Creation calls report a name-uniqueness failure as
/// [`DomainError::Conflict`] so callers can retry with a fresh name.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GiteaClient: Send + Sync {
    async fn server_version(&self) -> Result<ServerVersion, DomainError>;

    async fn create_user(&self, option: CreateUserOption) -> Result<GiteaUser, DomainError>;

    async fn edit_user(&self, username: &str, option: EditUserOption) -> Result<GiteaUser, DomainError>;

    /// Deletes a user together with every repository it owns
    async fn delete_user(&self, username: &str) -> Result<(), DomainError>;

    /// Lists users, one 1-based page at a time
    async fn list_users(&self, page: u32, limit: u32) -> Result<Vec<GiteaUser>, DomainError>;

    async fn create_user_public_key(
        &self,
        username: &str,
        option: CreateKeyOption,
    ) -> Result<PublicKey, DomainError>;

    async fn create_user_repo(
        &self,
        owner: &str,
        option: CreateRepoOption,
    ) -> Result<GiteaRepo, DomainError>;

    /// Lists an organisation's repositories, one 1-based page at a time
    async fn list_org_repos(&self, org: &str, page: u32, limit: u32) -> Result<Vec<GiteaRepo>, DomainError>;

    async fn delete_repo(&self, owner: &str, name: &str) -> Result<(), DomainError>;

    async fn create_org(&self, option: CreateOrgOption) -> Result<Organization, DomainError>;

    async fn edit_git_hook(
        &self,
        owner: &str,
        repo: &str,
        hook: GitHook,
        option: EditGitHookOption,
    ) -> Result<(), DomainError>;

    /// Creates a token for the authenticated user
    async fn create_access_token(
        &self,
        username: &str,
        option: CreateAccessTokenOption,
    ) -> Result<AccessToken, DomainError>;
}
