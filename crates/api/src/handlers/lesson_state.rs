//! Handlers for the `/lessons/{conversation_id}` lesson-state resource.
//!
//! One live snapshot per conversation; every endpoint verifies the
//! conversation belongs to the caller before touching the snapshot.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use cleo_core::error::CoreError;
use cleo_core::lesson::clamp_completion_percent;
use cleo_core::types::DbId;
use cleo_db::models::conversation::Conversation;
use cleo_db::models::lesson_state::{LessonState, UpsertLessonState};
use cleo_db::repositories::{ConversationRepo, LessonStateRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// PUT /api/v1/lessons/{conversation_id}/state
///
/// Upsert the live progress snapshot. Clients funnel UI-driven updates
/// through a debounce before calling this; the handler itself is a plain
/// write.
pub async fn save_state(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<DbId>,
    Json(mut input): Json<UpsertLessonState>,
) -> AppResult<Json<DataResponse<LessonState>>> {
    require_owned(&state, conversation_id, &auth).await?;
    input.completion_percent = clamp_completion_percent(input.completion_percent);

    let snapshot =
        LessonStateRepo::upsert(&state.pool, conversation_id, auth.user_id, &input).await?;
    Ok(Json(DataResponse::new(snapshot)))
}

/// GET /api/v1/lessons/{conversation_id}/state
///
/// Return the current snapshot, or 404 when the conversation has never
/// been saved.
pub async fn get_state(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<DbId>,
) -> AppResult<Json<DataResponse<LessonState>>> {
    require_owned(&state, conversation_id, &auth).await?;

    let snapshot = LessonStateRepo::find(&state.pool, conversation_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "LessonState",
            id: conversation_id,
        }))?;
    Ok(Json(DataResponse::new(snapshot)))
}

/// POST /api/v1/lessons/{conversation_id}/pause
///
/// Save the snapshot with `paused_at` set and bump the conversation's
/// pause counter.
pub async fn pause_lesson(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<DbId>,
    Json(mut input): Json<UpsertLessonState>,
) -> AppResult<Json<DataResponse<LessonState>>> {
    require_owned(&state, conversation_id, &auth).await?;
    input.completion_percent = clamp_completion_percent(input.completion_percent);

    let snapshot =
        LessonStateRepo::pause(&state.pool, conversation_id, auth.user_id, &input).await?;
    Ok(Json(DataResponse::new(snapshot)))
}

/// POST /api/v1/lessons/{conversation_id}/resume
///
/// Clear `paused_at`, bump the conversation's resume counter, and return
/// the snapshot so the client can restore the exact position.
pub async fn resume_lesson(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<DbId>,
) -> AppResult<Json<DataResponse<LessonState>>> {
    require_owned(&state, conversation_id, &auth).await?;

    let snapshot = LessonStateRepo::resume(&state.pool, conversation_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "LessonState",
            id: conversation_id,
        }))?;
    Ok(Json(DataResponse::new(snapshot)))
}

/// POST /api/v1/lessons/{conversation_id}/complete
///
/// Finalize the lesson: completion forced to 100, `completed_at` stamped
/// once, conversation status flipped. Calling this again on a finished
/// lesson is a no-op that returns the same terminal state.
pub async fn complete_lesson(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<DbId>,
    Json(input): Json<UpsertLessonState>,
) -> AppResult<Json<DataResponse<LessonState>>> {
    require_owned(&state, conversation_id, &auth).await?;

    let snapshot =
        LessonStateRepo::complete(&state.pool, conversation_id, auth.user_id, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        conversation_id,
        "Lesson completed"
    );
    Ok(Json(DataResponse::new(snapshot)))
}

/// DELETE /api/v1/lessons/{conversation_id}/state
///
/// Hard-delete the snapshot (explicit discard of progress). Returns 204
/// on success, 404 when there was nothing to discard.
pub async fn clear_state(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_owned(&state, conversation_id, &auth).await?;

    let deleted = LessonStateRepo::delete(&state.pool, conversation_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "LessonState",
            id: conversation_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the conversation and verify it belongs to the caller.
async fn require_owned(
    state: &AppState,
    conversation_id: DbId,
    auth: &AuthUser,
) -> AppResult<Conversation> {
    let conversation = ConversationRepo::find_by_id(&state.pool, conversation_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Conversation",
            id: conversation_id,
        }))?;
    if conversation.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Conversation belongs to another user".into(),
        )));
    }
    Ok(conversation)
}
