//! Shared fixtures for the API endpoint tests.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use cleo_api::auth::jwt::JwtConfig;
use cleo_api::config::ServerConfig;
use cleo_api::router::build_app_router;
use cleo_api::state::AppState;

/// A `ServerConfig` with test defaults and a fixed JWT secret, so tests
/// can mint tokens the app will accept.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        ai_cost_per_minute: 0.06,
        jwt: JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The production router over the given pool, full middleware stack
/// included, so endpoint tests see exactly what deployments see.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}
