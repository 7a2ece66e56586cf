//! Request and result types of a provisioning run

use serde::{Deserialize, Serialize};

use crate::domain::credentials::SshCredentials;

use super::identity::Identity;
use super::repo_spec::{ProvisionedRepo, RepoSpec};

pub const VAR_USERNAME: &str = "GITEA_USERNAME";
pub const VAR_PASSWORD: &str = "GITEA_PASSWORD";
pub const VAR_PRIVATE_KEY: &str = "GITEA_PRIV_KEY";
pub const VAR_PUBLIC_KEY: &str = "GITEA_PUB_KEY";
pub const VAR_KEYSCAN: &str = "GITEA_KEYSCAN";

/// Body of a `/newuser` request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserRequest {
    #[serde(rename = "Repos", default)]
    pub repos: Vec<RepoSpec>,
}

/// Flat `KEY=VALUE` variable list returned to the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningResult {
    #[serde(rename = "Vars")]
    pub vars: Vec<String>,
}

impl ProvisioningResult {
    /// Assemble the result in its fixed order: identity, credentials, host
    /// keys, then one entry per repository in input order
    pub fn assemble(
        identity: &Identity,
        credentials: &SshCredentials,
        keyscan: Option<&str>,
        host: &str,
        repos: &[ProvisionedRepo],
    ) -> Self {
        let mut vars = vec![
            format!("{}={}", VAR_USERNAME, identity.username()),
            format!("{}={}", VAR_PASSWORD, identity.password()),
            format!("{}={}", VAR_PRIVATE_KEY, credentials.private_key_pem()),
            format!("{}={}", VAR_PUBLIC_KEY, credentials.authorized_key()),
        ];

        if let Some(scan) = keyscan.filter(|s| !s.is_empty()) {
            vars.push(format!("{}={}", VAR_KEYSCAN, scan));
        }

        vars.extend(
            repos
                .iter()
                .map(|repo| format!("{}={}", repo.spec.var, repo.location(host))),
        );

        Self { vars }
    }

    /// Look up a variable's value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.iter().find_map(|entry| {
            entry
                .split_once('=')
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v)
        })
    }
}
