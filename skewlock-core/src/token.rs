//! Affinity Token Carrier
//!
//! The affinity token pins a session to one deployment version for a bounded
//! window. The carrier is an HTTP cookie, but the policy here is transport
//! agnostic: `issue` and `read` operate on plain strings so the pinning
//! contract is unit-testable without an HTTP stack.
//!
//! Expiry is absolute from issuance and delegated entirely to the cookie
//! transport (`Max-Age`); nothing in-process tracks token age. A token that
//! expired in the client simply never arrives, which the middleware treats
//! the same as "no token".

use std::fmt;
use std::time::Duration;

use crate::version::{EnvironmentTier, VersionId};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Cookie name carrying the affinity token.
pub const AFFINITY_COOKIE_NAME: &str = "__vdpl";

/// Default affinity window (5 minutes).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(300);

// ============================================================================
// TOKEN
// ============================================================================

/// Opaque token pinning a session to a deployment version.
///
/// Never mutated once issued within its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinityToken {
    value: VersionId,
}

impl AffinityToken {
    pub fn value(&self) -> &VersionId {
        &self.value
    }

    pub fn into_value(self) -> VersionId {
        self.value
    }
}

impl fmt::Display for AffinityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

// ============================================================================
// SAME-SITE POLICY
// ============================================================================

/// Cross-origin request policy for the token cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    /// Sent on top-level navigation and same-site requests, withheld on
    /// arbitrary cross-site requests. The default: persists across normal
    /// navigation without widening CSRF exposure.
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

// ============================================================================
// POLICY
// ============================================================================

/// Issuance and transport policy for affinity tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Cookie name used as the carrier.
    pub cookie_name: String,

    /// Fixed validity window, absolute from issuance (non-sliding).
    pub ttl: Duration,

    /// Path scope of the cookie. The whole application by default.
    pub path: String,

    /// Keep the cookie out of reach of client-side script.
    pub http_only: bool,

    /// Cross-site request policy.
    pub same_site: SameSite,

    /// Restrict the cookie to secure channels.
    pub require_secure: bool,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            cookie_name: AFFINITY_COOKIE_NAME.to_string(),
            ttl: DEFAULT_TOKEN_TTL,
            path: "/".to_string(),
            http_only: true,
            same_site: SameSite::Lax,
            require_secure: false,
        }
    }
}

impl TokenPolicy {
    /// Default policy with the secure flag derived from the environment tier.
    pub fn for_environment(environment: EnvironmentTier) -> Self {
        Self {
            require_secure: environment.requires_secure_transport(),
            ..Self::default()
        }
    }

    /// Mint a token pinning a session to `version`.
    pub fn issue(&self, version: &VersionId) -> AffinityToken {
        AffinityToken {
            value: version.clone(),
        }
    }

    /// Read the affinity token from a raw `Cookie` header, if present.
    ///
    /// A malformed or unexpected value yields `None`: on the request path a
    /// bad token is indistinguishable from no token, and a fresh one will be
    /// minted. Requests are never rejected here.
    pub fn read(&self, cookie_header: Option<&str>) -> Option<AffinityToken> {
        let header = cookie_header?;
        let raw = cookie_value(header, &self.cookie_name)?;
        let value = VersionId::new(raw).ok()?;
        Some(AffinityToken { value })
    }

    /// Render the `Set-Cookie` value attaching `token` to a response.
    pub fn set_cookie_value(&self, token: &AffinityToken) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}",
            self.cookie_name,
            token.value,
            self.path,
            self.ttl.as_secs()
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie.push_str("; SameSite=");
        cookie.push_str(self.same_site.as_str());
        if self.require_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Extract a named cookie value from a raw `Cookie` header.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name {
            Some(value.trim())
        } else {
            None
        }
    })
}

// ============================================================================
// TESTS
// ============================================================================
