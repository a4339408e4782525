//! REST API Routes Module
//!
//! Routes exposed by the affinity service:
//!
//! - Affinity diagnostics (`/affinity`)
//! - Health check endpoints (Kubernetes-compatible liveness)
//! - OpenAPI document (`/openapi.json`)
//!
//! The affinity middleware is layered over the whole router; path
//! exclusions are configuration inside the middleware, not route shapes.

pub mod affinity;
pub mod health;

use axum::{middleware::from_fn_with_state, response::IntoResponse, routing::get, Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::middleware::{affinity_middleware, AffinityMiddlewareState};
use crate::openapi::ApiDoc;

/// Create the complete API router with the affinity middleware applied.
pub fn create_api_router(state: AffinityMiddlewareState) -> Router {
    Router::new()
        .merge(affinity::create_router(state.clone()))
        .nest("/health", health::create_router())
        .route("/openapi.json", get(openapi_spec))
        .layer(from_fn_with_state(state, affinity_middleware))
        .layer(TraceLayer::new_for_http())
}

/// GET /openapi.json - OpenAPI specification document
async fn openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
