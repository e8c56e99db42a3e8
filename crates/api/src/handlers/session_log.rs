//! Handler for end-of-session reporting.
//!
//! The single place where elapsed voice-session time becomes a quota
//! deduction and a durable ledger row.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use cleo_core::error::CoreError;
use cleo_core::quota;
use cleo_core::types::{DbId, Timestamp};
use cleo_db::models::session_log::CreateSessionLog;
use cleo_db::repositories::{ConversationRepo, QuotaPeriodRepo, SessionLogRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /sessions/log`.
#[derive(Debug, Deserialize)]
pub struct LogSessionRequest {
    pub conversation_id: DbId,
    pub duration_seconds: i64,
    #[serde(default)]
    pub was_interrupted: bool,
    pub session_start: Timestamp,
    /// Client-generated per-session token; replays of the same token are
    /// rejected with 409 instead of charging twice.
    pub idempotency_key: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/log
///
/// Record a completed voice session: insert the immutable ledger row and
/// apply the bonus-first quota deduction in one transaction, then return
/// the new balance and the session's cost estimate. This endpoint never
/// creates quota periods; a missing current period is an internal fault
/// (the quota check runs before any session starts).
pub async fn log_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<LogSessionRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if input.duration_seconds <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "duration_seconds must be positive".into(),
        )));
    }
    if input.idempotency_key.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "idempotency_key must not be empty".into(),
        )));
    }

    let conversation = ConversationRepo::find_by_id(&state.pool, input.conversation_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Conversation",
            id: input.conversation_id,
        }))?;
    if conversation.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Conversation belongs to another user".into(),
        )));
    }

    let now = Utc::now();
    let period = QuotaPeriodRepo::find_current(&state.pool, auth.user_id, now)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!(
                "No active quota period for user {} at session end",
                auth.user_id
            ))
        })?;

    let minutes_charged = quota::billable_minutes(input.duration_seconds);
    let ai_cost_estimate =
        quota::estimate_ai_cost(input.duration_seconds, state.config.ai_cost_per_minute);
    let split = quota::split_deduction(period.bonus, period.remaining, minutes_charged);

    let (log, period) = SessionLogRepo::record_and_charge(
        &state.pool,
        &CreateSessionLog {
            user_id: auth.user_id,
            conversation_id: input.conversation_id,
            quota_period_id: period.id,
            session_start: input.session_start,
            session_end: input.session_start + Duration::seconds(input.duration_seconds),
            duration_seconds: input.duration_seconds,
            minutes_charged,
            was_interrupted: input.was_interrupted,
            ai_cost_estimate,
            idempotency_key: input.idempotency_key.clone(),
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        conversation_id = input.conversation_id,
        session_log_id = log.id,
        minutes_charged,
        from_bonus = split.from_bonus,
        from_base = split.from_base,
        minutes_remaining = period.minutes_remaining(),
        was_interrupted = input.was_interrupted,
        "Voice session charged"
    );

    Ok(Json(serde_json::json!({
        "data": {
            "session_log_id": log.id,
            "minutes_charged": log.minutes_charged,
            "minutes_remaining": period.minutes_remaining(),
            "ai_cost_estimate": log.ai_cost_estimate,
        }
    })))
}
