//! Provisioning endpoint: `POST /newuser`

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::Json;
use tracing::{error, info};

use crate::domain::{NewUserRequest, ProvisioningResult};

use super::state::AppState;
use super::types::ApiError;

/// Waits for the startup bootstrap, then provisions one account
///
/// The body is decoded by hand so that malformed JSON yields a plain
/// `failed to decode request` diagnostic rather than axum's rejection.
pub async fn new_user_handler(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Json<ProvisioningResult>, ApiError> {
    let host_keys = state.readiness.wait().await;

    if method != Method::POST {
        return Err(ApiError::bad_request(format!("method {} not supported", method)));
    }

    let request: NewUserRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("failed to decode request: {}", e)))?;

    match state.provisioning.new_user(request, host_keys).await {
        Ok(result) => {
            info!(vars = result.vars.len(), "Provisioned new user");
            Ok(Json(result))
        }
        Err(e) => {
            error!(error = %e, "Provisioning failed");
            Err(e.into())
        }
    }
}
