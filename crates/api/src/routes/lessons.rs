//! Route definitions for the `/lessons` lesson-state resource.
//!
//! All endpoints require authentication and conversation ownership.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::lesson_state;
use crate::state::AppState;

/// Routes mounted at `/lessons`.
///
/// ```text
/// PUT    /{conversation_id}/state    -> save_state
/// GET    /{conversation_id}/state    -> get_state
/// DELETE /{conversation_id}/state    -> clear_state
/// POST   /{conversation_id}/pause    -> pause_lesson
/// POST   /{conversation_id}/resume   -> resume_lesson
/// POST   /{conversation_id}/complete -> complete_lesson
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{conversation_id}/state",
            put(lesson_state::save_state)
                .get(lesson_state::get_state)
                .delete(lesson_state::clear_state),
        )
        .route("/{conversation_id}/pause", post(lesson_state::pause_lesson))
        .route("/{conversation_id}/resume", post(lesson_state::resume_lesson))
        .route(
            "/{conversation_id}/complete",
            post(lesson_state::complete_lesson),
        )
}
