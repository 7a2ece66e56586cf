//! Generated account identity

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::domain::DomainError;

/// Full name every account created by this service carries
///
/// The reaper only ever deletes accounts with this full name.
pub const TEMPORARY_USER_FULL_NAME: &str = "A really very temporary user";

/// Fewest random bytes a generated password may carry
pub const MIN_PASSWORD_BYTES: usize = 30;

/// Default number of random bytes behind a generated password
pub const DEFAULT_PASSWORD_BYTES: usize = MIN_PASSWORD_BYTES;

/// A generated username/password pair for one ephemeral account
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
    email: String,
    password: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Generate a URL-safe random password from `bytes` bytes of OS entropy
pub fn generate_password(bytes: usize) -> Result<String, DomainError> {
    if bytes < MIN_PASSWORD_BYTES {
        return Err(DomainError::configuration(format!(
            "password needs at least {} random bytes, got {}",
            MIN_PASSWORD_BYTES, bytes
        )));
    }

    let mut random = vec![0u8; bytes];
    OsRng
        .try_fill_bytes(&mut random)
        .map_err(|e| DomainError::key_generation(format!("failed to read random bytes: {}", e)))?;

    let password = URL_SAFE.encode(&random);
    random.zeroize();

    Ok(password)
}
