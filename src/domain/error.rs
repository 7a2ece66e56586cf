use thiserror::Error;

/// How an error should be reported at the top-level boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed invocation or request; reported without retry
    Usage,
    /// Expected runtime failure (upstream, collisions, environment)
    Known,
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("{service} error{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Upstream {
        service: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to create {resource} after {attempts} attempts: {last}")]
    CollisionExhausted {
        resource: String,
        attempts: u32,
        last: String,
    },

    #[error("Key generation failed: {message}")]
    KeyGeneration { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Command failed: {command}: {message}")]
    Process { command: String, message: String },

    #[error("Timed out: {message}")]
    Timeout { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn upstream(service: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    pub fn collision_exhausted(resource: impl Into<String>, attempts: u32, last: &DomainError) -> Self {
        Self::CollisionExhausted {
            resource: resource.into(),
            attempts,
            last: last.to_string(),
        }
    }

    pub fn key_generation(message: impl Into<String>) -> Self {
        Self::KeyGeneration {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn process(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Process {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is an upstream name-uniqueness failure
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Usage,
            _ => ErrorKind::Known,
        }
    }
}
