//! SSH credential domain

mod keypair;
pub mod openssh;
pub mod wire;

pub use keypair::{CredentialIssuer, SshCredentials};
