//! Application state shared by the HTTP handlers

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{DomainError, NewUserRequest, ProvisioningResult};
use crate::infrastructure::services::{ProvisioningService, Readiness};

use super::version::BuildInfo;

/// Application state, constructed once at startup and cloned per request
#[derive(Clone)]
pub struct AppState {
    pub provisioning: Arc<dyn ProvisioningServiceTrait>,
    pub readiness: Arc<Readiness>,
    pub build_info: Arc<BuildInfo>,
}

impl AppState {
    pub fn new(provisioning: Arc<dyn ProvisioningServiceTrait>, readiness: Arc<Readiness>, build_info: BuildInfo) -> Self {
        Self {
            provisioning,
            readiness,
            build_info: Arc::new(build_info),
        }
    }
}

/// Trait for provisioning operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProvisioningServiceTrait: Send + Sync {
    async fn new_user(
        &self,
        request: NewUserRequest,
        host_keys: Option<Arc<str>>,
    ) -> Result<ProvisioningResult, DomainError>;
}

#[async_trait]
impl ProvisioningServiceTrait for ProvisioningService {
    async fn new_user(
        &self,
        request: NewUserRequest,
        host_keys: Option<Arc<str>>,
    ) -> Result<ProvisioningResult, DomainError> {
        ProvisioningService::new_user(self, &request, host_keys.as_deref()).await
    }
}
