//! Build/version probe: `GET /?get-version=1`

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::Method;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::types::ApiError;

/// Build metadata reported by the version probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub repository: String,
}

impl BuildInfo {
    /// Metadata of this crate as compiled
    pub fn from_cargo() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: env!("CARGO_PKG_DESCRIPTION").to_string(),
            repository: env!("CARGO_PKG_REPOSITORY").to_string(),
        }
    }
}

/// Answers only `GET` with `get-version=1`; everything else is a 400
pub async fn version_handler(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<BuildInfo>, ApiError> {
    if method != Method::GET {
        return Err(ApiError::bad_request(format!("method {} not supported", method)));
    }

    if query.get("get-version").map(String::as_str) != Some("1") {
        return Err(ApiError::bad_request("missing get-version=1"));
    }

    Ok(Json(state.build_info.as_ref().clone()))
}

/// Any unrouted path
pub async fn fallback_handler() -> ApiError {
    ApiError::bad_request("unknown endpoint")
}
