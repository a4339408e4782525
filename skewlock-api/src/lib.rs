//! SKEWLOCK API - Deployment Affinity Middleware Service
//!
//! This crate is the HTTP-facing half of skew protection. It wraps the pure
//! decision logic from `skewlock-core` in an Axum middleware that pins each
//! client session to one deployment version via the `__vdpl` cookie, keeps
//! cache lifetimes inside the affinity window, and exposes a diagnostic
//! endpoint describing the resolved affinity state.

pub mod config;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod telemetry;

// Re-export commonly used types
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{affinity_middleware, AffinityMiddlewareState, DEPLOYMENT_ID_HEADER};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
