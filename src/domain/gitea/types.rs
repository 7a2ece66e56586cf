//! Gitea API payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiteaUser {
    #[serde(default)]
    pub id: i64,
    #[serde(alias = "username")]
    pub login: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiteaRepo {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub private: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserOption {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub must_change_password: bool,
    pub send_notify: bool,
}

/// Partial user update; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditUserOption {
    pub login_name: String,
    #[serde(default)]
    pub source_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_repo_creation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_create_organization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_git_hook: Option<bool>,
}

impl EditUserOption {
    /// Lock an account down: no repository or organisation creation and no
    /// git hooks
    pub fn restricted(user: &GiteaUser) -> Self {
        Self {
            login_name: user.login.clone(),
            source_id: 0,
            email: Some(user.email.clone()),
            full_name: Some(user.full_name.clone()),
            admin: None,
            max_repo_creation: Some(0),
            allow_create_organization: Some(false),
            allow_git_hook: Some(false),
        }
    }

    pub fn promote_to_admin(user: &GiteaUser) -> Self {
        Self {
            login_name: user.login.clone(),
            email: Some(user.email.clone()),
            full_name: Some(user.full_name.clone()),
            admin: Some(true),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateKeyOption {
    pub title: String,
    pub key: String,
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub id: i64,
    #[serde(default)]
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRepoOption {
    pub name: String,
    pub private: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrgOption {
    pub username: String,
    pub visibility: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    #[serde(alias = "username")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccessTokenOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub token_last_eight: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditGitHookOption {
    pub content: String,
}

/// Git hooks Gitea lets administrators edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHook {
    PreReceive,
    Update,
    PostReceive,
}

impl GitHook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreReceive => "pre-receive",
            Self::Update => "update",
            Self::PostReceive => "post-receive",
        }
    }
}
