//! API layer - HTTP endpoints and middleware

pub mod middleware;
pub mod newuser;
pub mod router;
pub mod state;
pub mod types;
pub mod version;

pub use router::create_router;
pub use state::{AppState, ProvisioningServiceTrait};
pub use version::BuildInfo;
