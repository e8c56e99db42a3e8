//! Route definitions for the `/sessions` resource.
//!
//! All endpoints require authentication.

use axum::routing::post;
use axum::Router;

use crate::handlers::session_log;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// POST /log -> log_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/log", post(session_log::log_session))
}
