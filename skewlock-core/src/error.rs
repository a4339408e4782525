//! Error types for SKEWLOCK core operations

use crate::version::MAX_VERSION_ID_LEN;
use thiserror::Error;

/// Version identifier validation errors.
///
/// These only surface when constructing a [`crate::VersionId`] from trusted
/// configuration. On the request path a value that fails validation is
/// treated as absent, never as an error (a malformed inbound cookie must not
/// reject the request).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("version identifier is empty")]
    Empty,

    #[error("version identifier exceeds {MAX_VERSION_ID_LEN} bytes")]
    TooLong,

    #[error("version identifier contains invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("unknown environment tier: {0}")]
    UnknownEnvironment(String),
}
