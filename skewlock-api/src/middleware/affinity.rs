//! Affinity Middleware for SKEWLOCK API
//!
//! Pins each client session to one immutable deployment version for a
//! bounded window during rolling releases, so a session never observes
//! mixed-version responses. The routing fabric reads the `__vdpl` cookie
//! from request metadata and dispatches to the matching backend; this
//! middleware only records and enforces the pin.
//!
//! Per request:
//!
//! 1. Excluded paths (build assets, fixed static files) pass through with
//!    the response untouched.
//! 2. An inbound token is propagated unchanged: no overwrite, no TTL reset.
//! 3. With no usable token, a fresh one is minted if a deployment identity
//!    is configured; otherwise the request proceeds unpinned.
//! 4. Whenever a version is known, the diagnostic `X-Deployment-ID` header
//!    is stamped on the response.
//! 5. Cache directives bounded by the affinity window are attached to every
//!    response, minted or not.
//!
//! There is no failure path. The middleware always yields the inner
//! response, at most augmented with headers and a cookie.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use skewlock_core::{
    evaluate, AffinityState, DeploymentIdentity, ExclusionRules, ResponseAugmentation, TokenPolicy,
};

use crate::config::ApiConfig;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Diagnostic response header carrying the current deployment identifier.
///
/// Observability only; consumers must not rely on it for correctness.
pub const DEPLOYMENT_ID_HEADER: &str = "x-deployment-id";

// ============================================================================
// STATE
// ============================================================================

/// Shared state for the affinity middleware.
///
/// All fields are immutable after startup; concurrent requests share them
/// read-only with no synchronization.
#[derive(Clone)]
pub struct AffinityMiddlewareState {
    /// Process-wide deployment identity, resolved once.
    pub identity: Arc<DeploymentIdentity>,

    /// Token issuance and transport policy.
    pub policy: TokenPolicy,

    /// Paths the middleware must not touch.
    pub exclusions: ExclusionRules,
}

impl AffinityMiddlewareState {
    /// State with default policy and exclusions for the given identity.
    pub fn new(identity: DeploymentIdentity) -> Self {
        let policy = TokenPolicy::for_environment(identity.environment());
        Self {
            identity: Arc::new(identity),
            policy,
            exclusions: ExclusionRules::default(),
        }
    }

    /// State configured from an [`ApiConfig`].
    pub fn from_config(identity: DeploymentIdentity, config: &ApiConfig) -> Self {
        let policy = config.token_policy(identity.environment());
        Self {
            identity: Arc::new(identity),
            policy,
            exclusions: config.exclusions.clone(),
        }
    }

    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionRules) -> Self {
        self.exclusions = exclusions;
        self
    }
}

// ============================================================================
// MIDDLEWARE
// ============================================================================

/// Axum middleware enforcing deployment affinity.
///
/// The decision is computed from the inbound request's own metadata before
/// the inner handler runs, then applied to whatever response comes back.
pub async fn affinity_middleware(
    State(state): State<AffinityMiddlewareState>,
    request: Request,
    next: Next,
) -> Response {
    // Version-immutable namespace: pinning would be redundant overhead.
    if state.exclusions.matches(request.uri().path()) {
        return next.run(request).await;
    }

    let cookie_header = request
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_owned());

    let outcome = evaluate(cookie_header.as_deref(), &state.identity, &state.policy);

    match &outcome.state {
        AffinityState::Pinned {
            version,
            minted: true,
        } => {
            tracing::info!(%version, "pinned session to deployment");
        }
        AffinityState::Pinned {
            version,
            minted: false,
        } => {
            tracing::debug!(%version, "using existing deployment pin");
        }
        AffinityState::Unpinned => {
            tracing::debug!("no deployment identity configured, request proceeds unpinned");
        }
    }

    let mut response = next.run(request).await;
    apply_augmentation(response.headers_mut(), &outcome.augmentation);
    response
}

/// Apply the computed augmentation to outbound response headers.
///
/// Header values derive from validated version identifiers, so encoding
/// failures should not occur; if one does, the directive is skipped and the
/// response still goes out.
fn apply_augmentation(headers: &mut HeaderMap, augmentation: &ResponseAugmentation) {
    if let Some(cookie) = &augmentation.set_cookie {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(_) => tracing::warn!("skipping unencodable Set-Cookie value"),
        }
    }

    if let Some(version) = &augmentation.deployment_header {
        match HeaderValue::from_str(version) {
            Ok(value) => {
                headers.insert(DEPLOYMENT_ID_HEADER, value);
            }
            Err(_) => tracing::warn!("skipping unencodable deployment id header"),
        }
    }

    match HeaderValue::from_str(&augmentation.cache_control) {
        Ok(value) => {
            headers.insert(header::CACHE_CONTROL, value);
        }
        Err(_) => tracing::warn!("skipping unencodable Cache-Control value"),
    }

    match HeaderValue::from_str(&augmentation.vary) {
        Ok(value) => {
            headers.insert(header::VARY, value);
        }
        Err(_) => tracing::warn!("skipping unencodable Vary value"),
    }
}

// ============================================================================
// TESTS
// ============================================================================
