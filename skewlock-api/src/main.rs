//! SKEWLOCK API Server Entry Point
//!
//! Bootstraps telemetry, resolves the deployment identity and configuration
//! from the environment, and starts the Axum HTTP server.

use std::net::SocketAddr;

use axum::Router;
use skewlock_api::telemetry::{init_tracing, TelemetryConfig};
use skewlock_api::{create_api_router, AffinityMiddlewareState, ApiConfig, ApiError, ApiResult};
use skewlock_core::DeploymentIdentity;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config);

    let identity = DeploymentIdentity::from_env();
    let api_config = ApiConfig::from_env();

    match identity.current_version() {
        Some(version) => tracing::info!(
            %version,
            environment = %identity.environment(),
            "skew protection active"
        ),
        None => tracing::warn!(
            environment = %identity.environment(),
            "no deployment identity configured, requests proceed unpinned"
        ),
    }

    let state = AffinityMiddlewareState::from_config(identity, &api_config);
    let app: Router = create_api_router(state);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting SKEWLOCK API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("SKEWLOCK_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("SKEWLOCK_API_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
