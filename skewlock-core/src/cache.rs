//! Cache Directives for Pinned Sessions
//!
//! A cached response must never outlive the affinity window: if the pin
//! expires at T, any cache entry produced under that pin must expire at or
//! before T as well. The directive is always private (content may
//! legitimately differ per pinned version, so shared caches are off the
//! table) and varies on the token carrier so two sessions pinned to
//! different versions never share an entry.

use std::time::Duration;

// ============================================================================
// VISIBILITY
// ============================================================================

/// Cache visibility scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheVisibility {
    /// Cacheable only by the requesting client.
    Private,
    /// Cacheable by shared caches. Never used for pinned content.
    Public,
}

impl CacheVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheVisibility::Private => "private",
            CacheVisibility::Public => "public",
        }
    }
}

// ============================================================================
// DIRECTIVE
// ============================================================================

/// Outbound cache-control metadata for one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirective {
    pub visibility: CacheVisibility,
    pub max_age: Duration,
    pub must_revalidate: bool,
    /// Request attribute caches must key entries by.
    pub vary: &'static str,
}

impl CacheDirective {
    /// Directive for a response served under an affinity window of `ttl`.
    ///
    /// `max_age` equals the window, so cache lifetime and pin lifetime expire
    /// together.
    pub fn for_affinity_window(ttl: Duration) -> Self {
        Self {
            visibility: CacheVisibility::Private,
            max_age: ttl,
            must_revalidate: true,
            vary: "Cookie",
        }
    }

    /// Directive with a caller-requested `max_age`, clamped to never exceed
    /// the affinity window.
    pub fn bounded(requested: Duration, ttl: Duration) -> Self {
        Self {
            max_age: requested.min(ttl),
            ..Self::for_affinity_window(ttl)
        }
    }

    /// Render the `Cache-Control` header value.
    pub fn cache_control_value(&self) -> String {
        let mut value = format!(
            "{}, max-age={}",
            self.visibility.as_str(),
            self.max_age.as_secs()
        );
        if self.must_revalidate {
            value.push_str(", must-revalidate");
        }
        value
    }

    /// Render the `Vary` header value.
    pub fn vary_value(&self) -> &'static str {
        self.vary
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_window_directive() {
        let directive = CacheDirective::for_affinity_window(Duration::from_secs(300));
        assert_eq!(directive.visibility, CacheVisibility::Private);
        assert_eq!(directive.max_age, Duration::from_secs(300));
        assert!(directive.must_revalidate);
        assert_eq!(directive.vary_value(), "Cookie");
    }

    #[test]
    fn test_cache_control_rendering() {
        let directive = CacheDirective::for_affinity_window(Duration::from_secs(300));
        assert_eq!(
            directive.cache_control_value(),
            "private, max-age=300, must-revalidate"
        );
    }

    #[test]
    fn test_bounded_clamps_to_window() {
        let ttl = Duration::from_secs(300);
        let clamped = CacheDirective::bounded(Duration::from_secs(3600), ttl);
        assert_eq!(clamped.max_age, ttl);

        let shorter = CacheDirective::bounded(Duration::from_secs(60), ttl);
        assert_eq!(shorter.max_age, Duration::from_secs(60));
    }

    #[test]
    fn test_max_age_never_exceeds_window() {
        for requested in [0u64, 1, 299, 300, 301, 86400] {
            let directive =
                CacheDirective::bounded(Duration::from_secs(requested), Duration::from_secs(300));
            assert!(directive.max_age <= Duration::from_secs(300));
        }
    }
}
