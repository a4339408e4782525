//! Middleware modules for SKEWLOCK API
//!
//! - `affinity`: Deployment affinity pinning and cache coordination
//!
//! # Middleware Order
//!
//! The affinity layer must be outermost so every response leaving the
//! service carries consistent cache directives:
//!
//! ```ignore
//! Router::new()
//!     .route("/", get(handler))
//!     .layer(middleware::from_fn_with_state(affinity_state, affinity_middleware))
//! ```

pub mod affinity;

// Re-export affinity middleware types
pub use affinity::{affinity_middleware, AffinityMiddlewareState, DEPLOYMENT_ID_HEADER};
