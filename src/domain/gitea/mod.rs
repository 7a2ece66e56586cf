//! Gitea domain: API payloads and the client trait

mod client;
mod types;

pub use client::GiteaClient;
pub use types::{
    AccessToken, CreateAccessTokenOption, CreateKeyOption, CreateOrgOption, CreateRepoOption,
    CreateUserOption, EditGitHookOption, EditUserOption, GitHook, GiteaRepo, GiteaUser,
    Organization, PublicKey, RepoOwner, ServerVersion,
};

#[cfg(test)]
pub use client::MockGiteaClient;
