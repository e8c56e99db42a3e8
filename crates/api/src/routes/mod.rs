pub mod admin;
pub mod health;
pub mod lessons;
pub mod quota;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /quota/check                          can the caller start a session (GET)
///
/// /sessions/log                         end-of-session report (POST)
///
/// /lessons/{conversation_id}/state      save, load, discard snapshot (PUT, GET, DELETE)
/// /lessons/{conversation_id}/pause      pause lesson (POST)
/// /lessons/{conversation_id}/resume     resume lesson (POST)
/// /lessons/{conversation_id}/complete   complete lesson (POST)
///
/// /admin/quota/bonus                    grant bonus minutes (POST, admin only)
/// /admin/maintenance/quota-backfill     create missing quota periods (POST, admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/quota", quota::router())
        .nest("/sessions", sessions::router())
        .nest("/lessons", lessons::router())
        .nest("/admin", admin::router())
}
