//! Liveness endpoint, mounted at the root (not under `/api/v1`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// GET /health
///
/// Liveness plus a database ping; reports 503 when the pool is unusable
/// so orchestrators can restart or drain the instance.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match cleo_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                version: env!("CARGO_PKG_VERSION"),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed to reach database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    version: env!("CARGO_PKG_VERSION"),
                }),
            )
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
