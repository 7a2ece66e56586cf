//! Provisioning domain
//!
//! Identities, repository descriptors, request validation and the flat
//! variable list a provisioning run produces.

mod identity;
mod repo_spec;
mod result;
mod validation;

pub use identity::{DEFAULT_PASSWORD_BYTES, Identity, MIN_PASSWORD_BYTES, TEMPORARY_USER_FULL_NAME, generate_password};
pub use repo_spec::{NamePattern, ProvisionedRepo, RepoSpec, WILDCARD};
pub use result::{
    NewUserRequest, ProvisioningResult, VAR_KEYSCAN, VAR_PASSWORD, VAR_PRIVATE_KEY, VAR_PUBLIC_KEY,
    VAR_USERNAME,
};
pub use validation::{RequestValidationError, validate_new_user_request, validate_repo_spec};
