//! Per-Request Affinity Decision
//!
//! Pure function from request metadata to the headers and cookie directives
//! a response must carry. No I/O, no locks, no shared mutable state:
//! concurrent invocations for different requests are fully independent, and
//! the HTTP middleware applies the result at the boundary.
//!
//! The decision has two halves with a strict internal order: first the token
//! decision (propagate or mint), then the cache directive, so the cache
//! window always matches whatever token ends up attached.

use crate::cache::CacheDirective;
use crate::token::TokenPolicy;
use crate::version::{DeploymentIdentity, VersionId};

// ============================================================================
// OUTCOME TYPES
// ============================================================================

/// Where a request ended up relative to the pinning contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffinityState {
    /// The session is pinned to a deployment version.
    Pinned {
        version: VersionId,
        /// Whether this response mints the pin (as opposed to propagating an
        /// existing one unchanged).
        minted: bool,
    },
    /// No deployment identity is configured; the request proceeds unpinned.
    Unpinned,
}

impl AffinityState {
    /// The version this session is pinned to, if any.
    pub fn pinned_version(&self) -> Option<&VersionId> {
        match self {
            AffinityState::Pinned { version, .. } => Some(version),
            AffinityState::Unpinned => None,
        }
    }
}

/// Headers and cookie directives to apply to the outbound response.
///
/// The response object itself is never touched here; the middleware applies
/// this augmentation at the transport boundary, and the worst failure mode
/// is a response that went out un-augmented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseAugmentation {
    /// `Set-Cookie` value, present only when a new token is minted.
    pub set_cookie: Option<String>,

    /// Diagnostic `X-Deployment-ID` value, present whenever a version is
    /// known. Observability only; nothing may rely on it for correctness.
    pub deployment_header: Option<String>,

    /// `Cache-Control` value, always present.
    pub cache_control: String,

    /// `Vary` value, always present.
    pub vary: String,
}

/// Result of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinityOutcome {
    pub state: AffinityState,
    pub augmentation: ResponseAugmentation,
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Decide the affinity handling for one request.
///
/// * An inbound token is propagated untouched: no overwrite, no TTL reset.
///   Re-pinning on every request would slide the window forward past a
///   rollout boundary and defeat skew protection.
/// * With no (or a malformed) inbound token, a fresh one is minted if the
///   identity source can resolve a current version; otherwise the request
///   proceeds unpinned and no cookie is ever set.
/// * Cache directives are computed from the same fixed window on every
///   response, including responses that carried a pre-existing token, so a
///   cached page can never outlive the pin.
pub fn evaluate(
    cookie_header: Option<&str>,
    identity: &DeploymentIdentity,
    policy: &TokenPolicy,
) -> AffinityOutcome {
    let (state, set_cookie) = match (policy.read(cookie_header), identity.current_version()) {
        (Some(existing), _) => (
            AffinityState::Pinned {
                version: existing.into_value(),
                minted: false,
            },
            None,
        ),
        (None, Some(current)) => {
            let token = policy.issue(current);
            let set_cookie = policy.set_cookie_value(&token);
            (
                AffinityState::Pinned {
                    version: token.into_value(),
                    minted: true,
                },
                Some(set_cookie),
            )
        }
        (None, None) => (AffinityState::Unpinned, None),
    };

    // Computed after the token decision so the cache window matches the
    // policy in force for this response.
    let cache = CacheDirective::for_affinity_window(policy.ttl);

    AffinityOutcome {
        state,
        augmentation: ResponseAugmentation {
            set_cookie,
            deployment_header: identity.current_version().map(|v| v.to_string()),
            cache_control: cache.cache_control_value(),
            vary: cache.vary_value().to_string(),
        },
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::EnvironmentTier;
    use std::time::Duration;

    fn production_identity(id: &str) -> DeploymentIdentity {
        DeploymentIdentity::pinned(VersionId::new(id).unwrap(), EnvironmentTier::Production)
    }

    fn policy() -> TokenPolicy {
        TokenPolicy::for_environment(EnvironmentTier::Production)
    }

    #[test]
    fn test_first_request_mints_token() {
        let outcome = evaluate(None, &production_identity("dep_123"), &policy());

        assert_eq!(
            outcome.state,
            AffinityState::Pinned {
                version: VersionId::new("dep_123").unwrap(),
                minted: true,
            }
        );
        let cookie = outcome.augmentation.set_cookie.unwrap();
        assert!(cookie.starts_with("__vdpl=dep_123"));
        assert!(cookie.contains("Max-Age=300"));
        assert_eq!(
            outcome.augmentation.deployment_header.as_deref(),
            Some("dep_123")
        );
    }

    #[test]
    fn test_existing_token_is_propagated_unchanged() {
        let outcome = evaluate(
            Some("__vdpl=dep_123"),
            &production_identity("dep_123"),
            &policy(),
        );

        assert!(outcome.augmentation.set_cookie.is_none());
        assert_eq!(
            outcome.state.pinned_version().unwrap().as_str(),
            "dep_123"
        );
    }

    #[test]
    fn test_pin_survives_rollout_boundary() {
        // A new deployment went live, but the session stays pinned to the
        // version in its still-valid token.
        let outcome = evaluate(
            Some("__vdpl=dep_123"),
            &production_identity("dep_456"),
            &policy(),
        );

        assert!(outcome.augmentation.set_cookie.is_none());
        assert_eq!(
            outcome.state.pinned_version().unwrap().as_str(),
            "dep_123"
        );
        // Diagnostic header reports the currently-running version.
        assert_eq!(
            outcome.augmentation.deployment_header.as_deref(),
            Some("dep_456")
        );
    }

    #[test]
    fn test_expired_token_is_repinned_to_current_version() {
        // Carrier-level expiry: the client dropped the cookie, so the server
        // sees no token and mints against whatever is current now.
        let outcome = evaluate(None, &production_identity("dep_456"), &policy());

        assert_eq!(
            outcome.state,
            AffinityState::Pinned {
                version: VersionId::new("dep_456").unwrap(),
                minted: true,
            }
        );
    }

    #[test]
    fn test_malformed_token_treated_as_absent() {
        let outcome = evaluate(
            Some("__vdpl=not a version!"),
            &production_identity("dep_123"),
            &policy(),
        );

        // Fresh token minted, request never rejected.
        assert!(outcome.augmentation.set_cookie.is_some());
        assert_eq!(
            outcome.state,
            AffinityState::Pinned {
                version: VersionId::new("dep_123").unwrap(),
                minted: true,
            }
        );
    }

    #[test]
    fn test_no_identity_fails_open() {
        let identity = DeploymentIdentity::unpinned(EnvironmentTier::Development);
        let outcome = evaluate(None, &identity, &policy());

        assert_eq!(outcome.state, AffinityState::Unpinned);
        assert!(outcome.augmentation.set_cookie.is_none());
        assert!(outcome.augmentation.deployment_header.is_none());
        // Cache directives still apply.
        assert_eq!(
            outcome.augmentation.cache_control,
            "private, max-age=300, must-revalidate"
        );
    }

    #[test]
    fn test_cache_window_matches_token_ttl() {
        let custom = TokenPolicy {
            ttl: Duration::from_secs(120),
            ..policy()
        };
        let outcome = evaluate(None, &production_identity("dep_123"), &custom);

        let cookie = outcome.augmentation.set_cookie.unwrap();
        assert!(cookie.contains("Max-Age=120"));
        assert_eq!(
            outcome.augmentation.cache_control,
            "private, max-age=120, must-revalidate"
        );
    }

    #[test]
    fn test_cache_directives_attached_on_every_branch() {
        let cases = [
            (None, production_identity("dep_123")),
            (Some("__vdpl=dep_123"), production_identity("dep_123")),
            (None, DeploymentIdentity::unpinned(EnvironmentTier::Development)),
        ];
        for (header, identity) in cases {
            let outcome = evaluate(header, &identity, &policy());
            assert_eq!(
                outcome.augmentation.cache_control,
                "private, max-age=300, must-revalidate"
            );
            assert_eq!(outcome.augmentation.vary, "Cookie");
        }
    }

    #[test]
    fn test_repeated_evaluation_is_idempotent() {
        // Once minted, replaying the issued cookie yields the same pin on
        // every subsequent request within the window.
        let identity = production_identity("dep_123");
        let first = evaluate(None, &identity, &policy());
        let cookie = first.augmentation.set_cookie.unwrap();
        let pair = cookie.split(';').next().unwrap().to_string();

        let mut last_version = first.state.pinned_version().cloned();
        for _ in 0..5 {
            let next = evaluate(Some(&pair), &identity, &policy());
            assert!(next.augmentation.set_cookie.is_none());
            assert_eq!(next.state.pinned_version().cloned(), last_version);
            last_version = next.state.pinned_version().cloned();
        }
    }
}
