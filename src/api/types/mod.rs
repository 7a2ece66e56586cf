//! HTTP response types

pub mod error;

pub use error::ApiError;
