//! Domain layer - Core types, traits and pure algorithms

pub mod credentials;
pub mod error;
pub mod gitea;
pub mod identifier;
pub mod mirror;
pub mod provisioning;

pub use credentials::{CredentialIssuer, SshCredentials};
pub use error::{DomainError, ErrorKind};
pub use gitea::{GiteaClient, GiteaRepo, GiteaUser};
pub use identifier::{IdGenerator, TimeIdGenerator};
pub use mirror::{MirrorProvider, MirrorTarget};
pub use provisioning::{
    Identity, NewUserRequest, ProvisionedRepo, ProvisioningResult, RepoSpec,
    TEMPORARY_USER_FULL_NAME,
};
