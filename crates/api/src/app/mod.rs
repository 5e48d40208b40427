//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: token codec, evaluator and the in-memory user directory
//! - `routes/`: RPC routes + handlers (one file per service)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use tenantgate_auth::{AccessPolicy, AuthConfig, ConfigError};

use crate::interceptor::AuthInterceptor;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Fails only on invalid configuration; nothing is served in that case.
pub fn build_app(config: &AuthConfig) -> Result<Router, ConfigError> {
    let services = Arc::new(services::build_services(config)?);
    let policy = Arc::new(AccessPolicy::from_config(&config.access)?);

    tracing::info!(
        algorithm = ?services.codec.algorithm(),
        duration_minutes = services.codec.duration().num_minutes(),
        open_methods = policy.methods(tenantgate_auth::Tier::Open).len(),
        public_user_methods = policy.methods(tenantgate_auth::Tier::PublicUser).len(),
        global_override = %config.global_override,
        "auth configured"
    );

    let interceptor = AuthInterceptor::new(policy, services.codec.clone());
    let auth_state = middleware::AuthState {
        interceptor: Arc::new(interceptor),
    };

    // Every RPC route goes through the interceptor.
    let intercepted = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(intercepted))
}
