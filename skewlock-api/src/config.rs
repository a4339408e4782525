//! API Configuration Module
//!
//! Configuration is loaded from environment variables once at startup, with
//! sensible defaults for development, and passed explicitly into the
//! middleware state. Nothing reads ambient globals on the request path.

use std::time::Duration;

use skewlock_core::{
    EnvironmentTier, ExclusionRules, TokenPolicy, AFFINITY_COOKIE_NAME, DEFAULT_TOKEN_TTL,
};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// Service configuration for the affinity middleware and its surfaces.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Fixed affinity window. Also bounds every cache max-age.
    pub token_ttl: Duration,

    /// Cookie name carrying the affinity token.
    pub cookie_name: String,

    /// Paths the middleware must not touch.
    pub exclusions: ExclusionRules,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token_ttl: DEFAULT_TOKEN_TTL,
            cookie_name: AFFINITY_COOKIE_NAME.to_string(),
            exclusions: ExclusionRules::default(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SKEWLOCK_TOKEN_TTL_SECS`: Affinity window in seconds (default: 300)
    /// - `SKEWLOCK_COOKIE_NAME`: Token cookie name (default: `__vdpl`)
    /// - `SKEWLOCK_EXCLUDE_PREFIXES`: Comma-separated excluded path prefixes
    /// - `SKEWLOCK_EXCLUDE_FILES`: Comma-separated excluded exact paths
    pub fn from_env() -> Self {
        let token_ttl = std::env::var("SKEWLOCK_TOKEN_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);

        let cookie_name = std::env::var("SKEWLOCK_COOKIE_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| AFFINITY_COOKIE_NAME.to_string());

        Self {
            token_ttl,
            cookie_name,
            exclusions: ExclusionRules::from_env(),
        }
    }

    /// Token policy for this configuration in the given environment tier.
    pub fn token_policy(&self, environment: EnvironmentTier) -> TokenPolicy {
        TokenPolicy {
            cookie_name: self.cookie_name.clone(),
            ttl: self.token_ttl,
            ..TokenPolicy::for_environment(environment)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.token_ttl, Duration::from_secs(300));
        assert_eq!(config.cookie_name, "__vdpl");
        assert!(config.exclusions.matches("/favicon.ico"));
    }

    #[test]
    fn test_token_policy_inherits_ttl_and_name() {
        let config = ApiConfig {
            token_ttl: Duration::from_secs(120),
            cookie_name: "__pin".to_string(),
            ..ApiConfig::default()
        };
        let policy = config.token_policy(EnvironmentTier::Production);
        assert_eq!(policy.ttl, Duration::from_secs(120));
        assert_eq!(policy.cookie_name, "__pin");
        assert!(policy.require_secure);
        assert!(policy.http_only);
    }

    #[test]
    fn test_token_policy_insecure_in_development() {
        let policy = ApiConfig::default().token_policy(EnvironmentTier::Development);
        assert!(!policy.require_secure);
    }
}
