//! Gitea provisioner
//!
//! Creates short-lived Gitea accounts for interactive tutorials: a user with
//! a random password, an Ed25519 SSH key, repositories named from request
//! patterns, and optionally GitHub mirrors. Expired accounts and
//! repositories are reaped by age.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::DomainError;
