//! Mapping of command failures to exit codes

use thiserror::Error;

use crate::domain::{DomainError, ErrorKind};

pub const EXIT_KNOWN: u8 = 1;
pub const EXIT_USAGE: u8 = 2;

#[derive(Debug, Error)]
pub enum CliError {
    /// Malformed invocation not caught by argument parsing
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Domain(e) if e.kind() == ErrorKind::Usage => EXIT_USAGE,
            Self::Domain(_) | Self::Other(_) => EXIT_KNOWN,
        }
    }

    pub fn is_usage(&self) -> bool {
        self.exit_code() == EXIT_USAGE
    }
}
