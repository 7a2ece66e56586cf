//! Infrastructure layer - External service implementations

pub mod credentials;
pub mod gitea;
pub mod github;
pub mod keyscan;
pub mod logging;
pub mod services;
