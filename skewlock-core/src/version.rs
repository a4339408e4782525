//! Deployment Version Identity
//!
//! The version identity source answers one question: which immutable
//! deployment is this process running? It is resolved once at startup and
//! injected explicitly wherever it is needed, so tests can simulate several
//! "versions" without touching ambient global state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Maximum accepted length of a deployment version identifier.
pub const MAX_VERSION_ID_LEN: usize = 128;

/// Environment variable holding the current deployment identifier.
pub const DEPLOYMENT_ID_ENV: &str = "SKEWLOCK_DEPLOYMENT_ID";

/// Environment variable holding the runtime environment tier.
pub const ENVIRONMENT_ENV: &str = "SKEWLOCK_ENVIRONMENT";

/// Environment variable holding the serving region, if any.
pub const REGION_ENV: &str = "SKEWLOCK_REGION";

// ============================================================================
// VERSION ID
// ============================================================================

/// Opaque, immutable deployment version identifier.
///
/// The value is a tag, never interpreted beyond equality. Validation only
/// ensures it survives the cookie transport unescaped: non-empty, bounded,
/// and restricted to a cookie-safe ASCII subset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(try_from = "String", into = "String")]
pub struct VersionId(String);

impl VersionId {
    /// Validate and construct a version identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, VersionError> {
        let value = value.into();
        if value.is_empty() {
            return Err(VersionError::Empty);
        }
        if value.len() > MAX_VERSION_ID_LEN {
            return Err(VersionError::TooLong);
        }
        if let Some(bad) = value.chars().find(|c| !is_version_char(*c)) {
            return Err(VersionError::InvalidCharacter(bad));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Characters permitted in a version identifier (cookie-value safe).
fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VersionId {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VersionId> for String {
    fn from(id: VersionId) -> Self {
        id.0
    }
}

impl FromStr for VersionId {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// ENVIRONMENT TIER
// ============================================================================

/// Runtime environment tier.
///
/// Only used to decide transport policy: everything except `Development`
/// requires the affinity cookie to be marked `Secure`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentTier {
    Production,
    Preview,
    #[default]
    Development,
}

impl EnvironmentTier {
    /// Whether the affinity cookie must only travel over a secure channel.
    pub fn requires_secure_transport(&self) -> bool {
        !matches!(self, EnvironmentTier::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentTier::Production => "production",
            EnvironmentTier::Preview => "preview",
            EnvironmentTier::Development => "development",
        }
    }
}

impl fmt::Display for EnvironmentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentTier {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(EnvironmentTier::Production),
            "preview" | "staging" => Ok(EnvironmentTier::Preview),
            "development" | "dev" | "local" => Ok(EnvironmentTier::Development),
            other => Err(VersionError::UnknownEnvironment(other.to_string())),
        }
    }
}

// ============================================================================
// DEPLOYMENT IDENTITY
// ============================================================================

/// Immutable process-wide deployment identity.
///
/// Resolved once per process lifetime and never reloaded. Absence of a
/// deployment identifier is not an error: it is the normal state of a
/// local/dev process, and callers must skip pinning entirely rather than
/// issue a placeholder value that could collide across environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentIdentity {
    deployment_id: Option<VersionId>,
    environment: EnvironmentTier,
    region: Option<String>,
}

impl DeploymentIdentity {
    /// Identity for a process serving a known deployment.
    pub fn pinned(deployment_id: VersionId, environment: EnvironmentTier) -> Self {
        Self {
            deployment_id: Some(deployment_id),
            environment,
            region: None,
        }
    }

    /// Identity for a process with no deployment identifier configured.
    pub fn unpinned(environment: EnvironmentTier) -> Self {
        Self {
            deployment_id: None,
            environment,
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Resolve the identity from environment variables.
    ///
    /// A missing or invalid `SKEWLOCK_DEPLOYMENT_ID` leaves the process
    /// unpinned; an unrecognized `SKEWLOCK_ENVIRONMENT` falls back to
    /// `Development`. Both are fail-open by design.
    pub fn from_env() -> Self {
        let environment = std::env::var(ENVIRONMENT_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let deployment_id = std::env::var(DEPLOYMENT_ID_ENV)
            .ok()
            .and_then(|s| VersionId::new(s).ok());

        let region = std::env::var(REGION_ENV).ok().filter(|s| !s.is_empty());

        Self {
            deployment_id,
            environment,
            region,
        }
    }

    /// The active deployment identifier, or `None` when the environment has
    /// none configured. Pure in-memory read, cheap enough for every request.
    pub fn current_version(&self) -> Option<&VersionId> {
        self.deployment_id.as_ref()
    }

    pub fn environment(&self) -> EnvironmentTier {
        self.environment
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Whether this process runs without a deployment identifier.
    pub fn is_local(&self) -> bool {
        self.deployment_id.is_none()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_id_accepts_typical_identifiers() {
        for value in ["dep_123", "dpl_9Xy-2", "v1.2.3", "sha:abc123"] {
            assert!(VersionId::new(value).is_ok(), "rejected {value}");
        }
    }

    #[test]
    fn test_version_id_rejects_empty() {
        assert_eq!(VersionId::new(""), Err(VersionError::Empty));
    }

    #[test]
    fn test_version_id_rejects_overlong() {
        let long = "a".repeat(MAX_VERSION_ID_LEN + 1);
        assert_eq!(VersionId::new(long), Err(VersionError::TooLong));
    }

    #[test]
    fn test_version_id_rejects_cookie_unsafe_characters() {
        for value in ["dep 123", "dep;123", "dep=123", "dep,123", "dép"] {
            assert!(
                matches!(VersionId::new(value), Err(VersionError::InvalidCharacter(_))),
                "accepted {value}"
            );
        }
    }

    #[test]
    fn test_version_id_serde_round_trip() {
        let id = VersionId::new("dep_123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"dep_123\"");
        let back: VersionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_version_id_deserialization_validates() {
        let result: Result<VersionId, _> = serde_json::from_str("\"not a version\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_environment_tier_parsing() {
        assert_eq!("production".parse(), Ok(EnvironmentTier::Production));
        assert_eq!("Prod".parse(), Ok(EnvironmentTier::Production));
        assert_eq!("staging".parse(), Ok(EnvironmentTier::Preview));
        assert_eq!("local".parse(), Ok(EnvironmentTier::Development));
        assert!("galaxy".parse::<EnvironmentTier>().is_err());
    }

    #[test]
    fn test_secure_transport_required_outside_development() {
        assert!(EnvironmentTier::Production.requires_secure_transport());
        assert!(EnvironmentTier::Preview.requires_secure_transport());
        assert!(!EnvironmentTier::Development.requires_secure_transport());
    }

    #[test]
    fn test_pinned_identity_exposes_version() {
        let identity = DeploymentIdentity::pinned(
            VersionId::new("dep_123").unwrap(),
            EnvironmentTier::Production,
        );
        assert_eq!(identity.current_version().unwrap().as_str(), "dep_123");
        assert!(!identity.is_local());
    }

    #[test]
    fn test_unpinned_identity_has_no_version() {
        let identity = DeploymentIdentity::unpinned(EnvironmentTier::Development);
        assert!(identity.current_version().is_none());
        assert!(identity.is_local());
        assert!(identity.region().is_none());
    }

    #[test]
    fn test_region_attachment() {
        let identity = DeploymentIdentity::unpinned(EnvironmentTier::Preview).with_region("iad1");
        assert_eq!(identity.region(), Some("iad1"));
    }
}
