//! In-memory Gitea used by service and handler tests

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::gitea::{
    AccessToken, CreateAccessTokenOption, CreateKeyOption, CreateOrgOption, CreateRepoOption,
    CreateUserOption, EditGitHookOption, EditUserOption, GitHook, GiteaClient, GiteaRepo,
    GiteaUser, Organization, PublicKey, RepoOwner, ServerVersion,
};
use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledHook {
    pub owner: String,
    pub repo: String,
    pub hook: GitHook,
    pub content: String,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: Vec<GiteaUser>,
    repos: Vec<GiteaRepo>,
    orgs: Vec<String>,
    keys: Vec<(String, CreateKeyOption)>,
    edits: Vec<(String, EditUserOption)>,
    hooks: Vec<InstalledHook>,
    tokens: Vec<(String, String)>,
    deleted_users: Vec<String>,
    deleted_repos: Vec<String>,
    user_create_attempts: Vec<String>,
    repo_create_attempts: Vec<String>,
    version_failures: u32,
    version_calls: u32,
    user_conflicts: u32,
    repo_conflicts: u32,
    fail_key_install: bool,
    fail_deletes: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Gitea server kept in process memory
///
/// Names are unique case-insensitively, as on a real server. Failures can be
/// scripted with the `reject_*`/`fail_*` methods.
#[derive(Debug, Default)]
pub struct InMemoryGitea {
    state: RwLock<State>,
}

fn paginate<T: Clone>(items: &[T], page: u32, limit: u32) -> Vec<T> {
    let limit = limit.max(1) as usize;
    let start = (page.max(1) as usize - 1) * limit;
    items.iter().skip(start).take(limit).cloned().collect()
}

impl InMemoryGitea {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }

    fn write<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    pub fn insert_user(&self, login: &str, full_name: &str, created: DateTime<Utc>) {
        self.write(|s| {
            let id = s.next_id();
            s.users.push(GiteaUser {
                id,
                login: login.to_string(),
                full_name: full_name.to_string(),
                email: format!("{}@example.com", login),
                created,
            });
        });
    }

    pub fn insert_repo(&self, owner: &str, name: &str, created: DateTime<Utc>) {
        self.write(|s| {
            let id = s.next_id();
            s.repos.push(GiteaRepo {
                id,
                name: name.to_string(),
                full_name: format!("{}/{}", owner, name),
                owner: RepoOwner {
                    login: owner.to_string(),
                },
                private: false,
                created_at: created,
            });
        });
    }

    pub fn insert_org(&self, name: &str) {
        self.write(|s| s.orgs.push(name.to_string()));
    }

    /// The next `n` version checks fail
    pub fn fail_version_checks(&self, n: u32) {
        self.write(|s| s.version_failures = n);
    }

    /// The next `n` user creations collide
    pub fn reject_next_user_creates(&self, n: u32) {
        self.write(|s| s.user_conflicts = n);
    }

    /// The next `n` repository creations collide
    pub fn reject_next_repo_creates(&self, n: u32) {
        self.write(|s| s.repo_conflicts = n);
    }

    pub fn fail_key_installs(&self) {
        self.write(|s| s.fail_key_install = true);
    }

    pub fn fail_deletes(&self) {
        self.write(|s| s.fail_deletes = true);
    }

    pub fn users(&self) -> Vec<GiteaUser> {
        self.read(|s| s.users.clone())
    }

    pub fn user(&self, login: &str) -> Option<GiteaUser> {
        self.read(|s| s.users.iter().find(|u| u.login.eq_ignore_ascii_case(login)).cloned())
    }

    pub fn repos(&self) -> Vec<GiteaRepo> {
        self.read(|s| s.repos.clone())
    }

    pub fn repos_of(&self, owner: &str) -> Vec<GiteaRepo> {
        self.read(|s| {
            s.repos
                .iter()
                .filter(|r| r.owner.login.eq_ignore_ascii_case(owner))
                .cloned()
                .collect()
        })
    }

    pub fn orgs(&self) -> Vec<String> {
        self.read(|s| s.orgs.clone())
    }

    pub fn keys_of(&self, login: &str) -> Vec<CreateKeyOption> {
        self.read(|s| {
            s.keys
                .iter()
                .filter(|(owner, _)| owner == login)
                .map(|(_, key)| key.clone())
                .collect()
        })
    }

    pub fn edits_of(&self, login: &str) -> Vec<EditUserOption> {
        self.read(|s| {
            s.edits
                .iter()
                .filter(|(owner, _)| owner == login)
                .map(|(_, edit)| edit.clone())
                .collect()
        })
    }

    pub fn hooks(&self) -> Vec<InstalledHook> {
        self.read(|s| s.hooks.clone())
    }

    pub fn tokens(&self) -> Vec<(String, String)> {
        self.read(|s| s.tokens.clone())
    }

    pub fn deleted_users(&self) -> Vec<String> {
        self.read(|s| s.deleted_users.clone())
    }

    pub fn deleted_repos(&self) -> Vec<String> {
        self.read(|s| s.deleted_repos.clone())
    }

    pub fn user_create_attempts(&self) -> Vec<String> {
        self.read(|s| s.user_create_attempts.clone())
    }

    pub fn repo_create_attempts(&self) -> Vec<String> {
        self.read(|s| s.repo_create_attempts.clone())
    }

    pub fn version_calls(&self) -> u32 {
        self.read(|s| s.version_calls)
    }
}

#[async_trait]
impl GiteaClient for InMemoryGitea {
    async fn server_version(&self) -> Result<ServerVersion, DomainError> {
        self.write(|s| {
            s.version_calls += 1;
            if s.version_failures > 0 {
                s.version_failures -= 1;
                return Err(DomainError::upstream("gitea", None, "connection refused"));
            }
            Ok(ServerVersion {
                version: "1.21.0".to_string(),
            })
        })
    }

    async fn create_user(&self, option: CreateUserOption) -> Result<GiteaUser, DomainError> {
        self.write(|s| {
            s.user_create_attempts.push(option.username.clone());

            if s.user_conflicts > 0 {
                s.user_conflicts -= 1;
                return Err(DomainError::conflict(format!(
                    "user already exists [name: {}]",
                    option.username
                )));
            }
            if s.users.iter().any(|u| u.login.eq_ignore_ascii_case(&option.username)) {
                return Err(DomainError::conflict(format!(
                    "user already exists [name: {}]",
                    option.username
                )));
            }

            let id = s.next_id();
            let user = GiteaUser {
                id,
                login: option.username,
                full_name: option.full_name,
                email: option.email,
                created: Utc::now(),
            };
            s.users.push(user.clone());
            Ok(user)
        })
    }

    async fn edit_user(&self, username: &str, option: EditUserOption) -> Result<GiteaUser, DomainError> {
        self.write(|s| {
            let user = s
                .users
                .iter()
                .find(|u| u.login == username)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("user {} not found", username)))?;
            s.edits.push((username.to_string(), option));
            Ok(user)
        })
    }

    async fn delete_user(&self, username: &str) -> Result<(), DomainError> {
        self.write(|s| {
            if s.fail_deletes {
                return Err(DomainError::upstream("gitea", Some(500), "delete failed"));
            }
            let before = s.users.len();
            s.users.retain(|u| u.login != username);
            if s.users.len() == before {
                return Err(DomainError::not_found(format!("user {} not found", username)));
            }
            s.repos.retain(|r| r.owner.login != username);
            s.deleted_users.push(username.to_string());
            Ok(())
        })
    }

    async fn list_users(&self, page: u32, limit: u32) -> Result<Vec<GiteaUser>, DomainError> {
        Ok(self.read(|s| paginate(&s.users, page, limit)))
    }

    async fn create_user_public_key(
        &self,
        username: &str,
        option: CreateKeyOption,
    ) -> Result<PublicKey, DomainError> {
        self.write(|s| {
            if s.fail_key_install {
                return Err(DomainError::upstream("gitea", Some(422), "key content is invalid"));
            }
            if !s.users.iter().any(|u| u.login == username) {
                return Err(DomainError::not_found(format!("user {} not found", username)));
            }
            let id = s.next_id();
            s.keys.push((username.to_string(), option));
            Ok(PublicKey {
                id,
                fingerprint: String::new(),
            })
        })
    }

    async fn create_user_repo(&self, owner: &str, option: CreateRepoOption) -> Result<GiteaRepo, DomainError> {
        self.write(|s| {
            s.repo_create_attempts.push(option.name.clone());

            if s.repo_conflicts > 0 {
                s.repo_conflicts -= 1;
                return Err(DomainError::conflict("repository already exists"));
            }
            let taken = s.repos.iter().any(|r| {
                r.owner.login.eq_ignore_ascii_case(owner) && r.name.eq_ignore_ascii_case(&option.name)
            });
            if taken {
                return Err(DomainError::conflict("repository already exists"));
            }

            let id = s.next_id();
            let repo = GiteaRepo {
                id,
                full_name: format!("{}/{}", owner, option.name),
                name: option.name,
                owner: RepoOwner {
                    login: owner.to_string(),
                },
                private: option.private,
                created_at: Utc::now(),
            };
            s.repos.push(repo.clone());
            Ok(repo)
        })
    }

    async fn list_org_repos(&self, org: &str, page: u32, limit: u32) -> Result<Vec<GiteaRepo>, DomainError> {
        Ok(self.read(|s| {
            let owned: Vec<GiteaRepo> = s.repos.iter().filter(|r| r.owner.login == org).cloned().collect();
            paginate(&owned, page, limit)
        }))
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> Result<(), DomainError> {
        self.write(|s| {
            if s.fail_deletes {
                return Err(DomainError::upstream("gitea", Some(500), "delete failed"));
            }
            let before = s.repos.len();
            s.repos.retain(|r| !(r.owner.login == owner && r.name == name));
            if s.repos.len() == before {
                return Err(DomainError::not_found(format!("repo {}/{} not found", owner, name)));
            }
            s.deleted_repos.push(format!("{}/{}", owner, name));
            Ok(())
        })
    }

    async fn create_org(&self, option: CreateOrgOption) -> Result<Organization, DomainError> {
        self.write(|s| {
            if s.orgs.iter().any(|o| o.eq_ignore_ascii_case(&option.username)) {
                return Err(DomainError::conflict("organization already exists"));
            }
            let id = s.next_id();
            s.orgs.push(option.username.clone());
            Ok(Organization {
                id,
                name: option.username,
            })
        })
    }

    async fn edit_git_hook(
        &self,
        owner: &str,
        repo: &str,
        hook: GitHook,
        option: EditGitHookOption,
    ) -> Result<(), DomainError> {
        self.write(|s| {
            s.hooks.push(InstalledHook {
                owner: owner.to_string(),
                repo: repo.to_string(),
                hook,
                content: option.content,
            });
            Ok(())
        })
    }

    async fn create_access_token(
        &self,
        username: &str,
        option: CreateAccessTokenOption,
    ) -> Result<AccessToken, DomainError> {
        self.write(|s| {
            let id = s.next_id();
            let sha1 = format!("{:040x}", id);
            s.tokens.push((username.to_string(), option.name.clone()));
            Ok(AccessToken {
                id,
                name: option.name,
                token_last_eight: sha1[sha1.len() - 8..].to_string(),
                sha1,
            })
        })
    }
}
