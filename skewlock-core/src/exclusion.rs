//! Path Exclusion Rules
//!
//! The build-asset namespace and fixed static files are version-immutable by
//! construction (content-addressed, or unchanged within a deployment), so
//! pinning them is redundant overhead. The exclusion set is static
//! configuration applied as plain string matching, not runtime logic.

/// Environment variable overriding the excluded path prefixes.
pub const EXCLUDE_PREFIXES_ENV: &str = "SKEWLOCK_EXCLUDE_PREFIXES";

/// Environment variable overriding the excluded exact paths.
pub const EXCLUDE_FILES_ENV: &str = "SKEWLOCK_EXCLUDE_FILES";

/// Declared set of paths the affinity middleware must not touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRules {
    prefixes: Vec<String>,
    exact: Vec<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            prefixes: vec!["/static/".to_string(), "/assets/".to_string()],
            exact: vec!["/favicon.ico".to_string(), "/robots.txt".to_string()],
        }
    }
}

impl ExclusionRules {
    pub fn new(prefixes: Vec<String>, exact: Vec<String>) -> Self {
        Self { prefixes, exact }
    }

    /// Rules from environment variables, falling back to the defaults.
    ///
    /// Both variables take comma-separated path lists.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            prefixes: env_paths(EXCLUDE_PREFIXES_ENV).unwrap_or(defaults.prefixes),
            exact: env_paths(EXCLUDE_FILES_ENV).unwrap_or(defaults.exact),
        }
    }

    /// Whether `path` belongs to the exclusion set.
    pub fn matches(&self, path: &str) -> bool {
        self.exact.iter().any(|p| p == path)
            || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

fn env_paths(var: &str) -> Option<Vec<String>> {
    let raw = std::env::var(var).ok()?;
    let paths: Vec<String> = raw
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if paths.is_empty() {
        None
    } else {
        Some(paths)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusions() {
        let rules = ExclusionRules::default();
        assert!(rules.matches("/static/app.js"));
        assert!(rules.matches("/assets/logo.svg"));
        assert!(rules.matches("/favicon.ico"));
        assert!(rules.matches("/robots.txt"));
    }

    #[test]
    fn test_page_and_api_paths_not_excluded() {
        let rules = ExclusionRules::default();
        assert!(!rules.matches("/"));
        assert!(!rules.matches("/api/orders"));
        assert!(!rules.matches("/checkout"));
        // Prefix match is on the path, not a substring
        assert!(!rules.matches("/docs/static/guide"));
    }

    #[test]
    fn test_exact_match_is_not_a_prefix() {
        let rules = ExclusionRules::default();
        assert!(!rules.matches("/favicon.ico.backup"));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ExclusionRules::new(
            vec!["/_next/static/".to_string()],
            vec!["/manifest.json".to_string()],
        );
        assert!(rules.matches("/_next/static/chunk.js"));
        assert!(rules.matches("/manifest.json"));
        assert!(!rules.matches("/favicon.ico"));
    }
}
