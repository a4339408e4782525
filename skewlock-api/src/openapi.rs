//! OpenAPI Specification for SKEWLOCK API
//!
//! Generated with utoipa from route annotations and response schemas.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::affinity::AffinityStatusResponse;
use crate::routes::health::{HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{affinity, health};

/// OpenAPI document for the SKEWLOCK API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SKEWLOCK API",
        version = "0.2.0",
        description = "Deployment affinity middleware: pins client sessions to one deployment version during rolling releases",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    paths(
        affinity::affinity_status,
        health::ping,
        health::liveness,
    ),
    components(schemas(
        AffinityStatusResponse,
        HealthResponse,
        HealthStatus,
        HealthDetails,
        ApiError,
        ErrorCode,
    )),
    tags(
        (name = "Affinity", description = "Deployment affinity diagnostics"),
        (name = "Health", description = "Liveness endpoints"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("/affinity"));
        assert!(json.contains("/health/ping"));
        assert!(json.contains("AffinityStatusResponse"));
    }
}
