//! Affinity Diagnostics Endpoint
//!
//! Read-only companion surface exposing the resolved affinity state as a
//! JSON document. Built entirely from values the middleware already
//! computes; no independent logic, no authentication.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::AffinityMiddlewareState;

// ============================================================================
// TYPES
// ============================================================================

/// Resolved affinity state for the requesting session.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AffinityStatusResponse {
    /// Currently-running deployment identifier, if configured.
    pub deployment_id: Option<String>,

    /// Runtime environment tier.
    pub environment: String,

    /// Serving region, if known.
    pub region: Option<String>,

    /// Affinity token carried by this request, if any.
    pub cookie_value: Option<String>,

    /// Time this document was produced.
    pub timestamp: DateTime<Utc>,

    /// Human-readable summary of the affinity state.
    pub message: String,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /affinity - Resolved affinity state for the requesting session
#[utoipa::path(
    get,
    path = "/affinity",
    tag = "Affinity",
    responses(
        (status = 200, description = "Resolved affinity state", body = AffinityStatusResponse),
    ),
)]
pub async fn affinity_status(
    State(state): State<AffinityMiddlewareState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let cookie_header = headers.get(header::COOKIE).and_then(|h| h.to_str().ok());
    let token = state.policy.read(cookie_header);

    let deployment_id = state.identity.current_version().map(|v| v.to_string());
    let cookie_value = token.as_ref().map(|t| t.value().to_string());

    let message = match (&cookie_value, &deployment_id) {
        (Some(pinned), _) => format!("session pinned to deployment {pinned}"),
        (None, Some(current)) => {
            format!("no affinity cookie on this request; a pin to {current} is issued on response")
        }
        (None, None) => "skew protection inactive: no deployment identity configured".to_string(),
    };

    let response = AffinityStatusResponse {
        deployment_id,
        environment: state.identity.environment().to_string(),
        region: state.identity.region().map(|r| r.to_string()),
        cookie_value,
        timestamp: Utc::now(),
        message,
    };

    (StatusCode::OK, Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the affinity diagnostics router.
pub fn create_router(state: AffinityMiddlewareState) -> Router {
    Router::new()
        .route("/affinity", get(affinity_status))
        .with_state(state)
}
