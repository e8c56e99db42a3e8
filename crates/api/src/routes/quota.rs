//! Route definitions for the `/quota` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::quota;
use crate::state::AppState;

/// Routes mounted at `/quota`.
///
/// ```text
/// GET /check -> check_quota
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/check", get(quota::check_quota))
}
