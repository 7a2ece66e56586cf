use axum::{routing::any, middleware, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::middleware::logging_middleware;
use super::newuser::new_user_handler;
use super::state::AppState;
use super::version::{fallback_handler, version_handler};

/// Create the router with application state
///
/// Routes accept every method; handlers reject the wrong one with 400.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(version_handler))
        .route("/newuser", any(new_user_handler))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
