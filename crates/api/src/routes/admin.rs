//! Route definitions for the `/admin` resource.
//!
//! All endpoints require the `admin` role.

use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST /quota/bonus                  -> add_bonus
/// POST /maintenance/quota-backfill   -> quota_backfill
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quota/bonus", post(admin::add_bonus))
        .route("/maintenance/quota-backfill", post(admin::quota_backfill))
}
