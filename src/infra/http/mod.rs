pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};
pub use middleware::{REQUEST_ID_HEADER, RequestContext};

use axum::{
    Router, http::StatusCode, middleware as axum_middleware, response::IntoResponse,
    routing::get,
};

/// Full HTTP surface: the `/api/v1` routes plus the liveness probe, wrapped in
/// request-id and response logging middleware.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(build_api_router(state))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

async fn health() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
