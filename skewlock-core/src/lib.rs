//! SKEWLOCK Core - Deployment Affinity Primitives
//!
//! This crate contains the pure logic behind skew protection: pinning a
//! client session to one immutable deployment version for a bounded window
//! during a rolling release, so the session never observes mixed-version
//! responses (HTML from one deployment, API payloads from another).
//!
//! Everything here is framework-free and side-effect-free. The HTTP-facing
//! middleware in `skewlock-api` feeds request metadata in and applies the
//! resulting [`ResponseAugmentation`] at the transport boundary.

pub mod affinity;
pub mod cache;
pub mod error;
pub mod exclusion;
pub mod token;
pub mod version;

// Re-export commonly used types
pub use affinity::{evaluate, AffinityOutcome, AffinityState, ResponseAugmentation};
pub use cache::{CacheDirective, CacheVisibility};
pub use error::VersionError;
pub use exclusion::ExclusionRules;
pub use token::{
    AffinityToken, SameSite, TokenPolicy, AFFINITY_COOKIE_NAME, DEFAULT_TOKEN_TTL,
};
pub use version::{DeploymentIdentity, EnvironmentTier, VersionId, MAX_VERSION_ID_LEN};
