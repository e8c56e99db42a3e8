//! Handlers for the `/admin` resource (quota administration).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use cleo_core::error::CoreError;
use cleo_core::types::DbId;
use cleo_db::models::quota_period::CreateQuotaPeriod;
use cleo_db::models::user::User;
use cleo_db::repositories::{QuotaPeriodRepo, SubscriptionRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/quota/bonus`.
///
/// The target may be addressed by database id or by email; exactly one
/// is required.
#[derive(Debug, Deserialize)]
pub struct AddBonusRequest {
    pub user_id: Option<DbId>,
    pub email: Option<String>,
    pub minutes: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/quota/bonus
///
/// Add top-up minutes to the target user's current quota period, lazily
/// creating the period from their active subscription when needed. The
/// minutes land in the bonus pool (spent before the base pool) and also
/// grow `total_allowed`; `remaining` is never credited.
pub async fn add_bonus(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<AddBonusRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if input.minutes <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "minutes must be positive".into(),
        )));
    }

    let target = resolve_target(&state, &input).await?;
    let now = Utc::now();

    let period = match QuotaPeriodRepo::find_current(&state.pool, target.id, now).await? {
        Some(period) => period,
        None => {
            let sub = SubscriptionRepo::find_active(&state.pool, target.id, now)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Conflict(
                        "Target user has no active subscription to anchor a quota period".into(),
                    ))
                })?;
            QuotaPeriodRepo::find_or_create(
                &state.pool,
                &CreateQuotaPeriod {
                    user_id: target.id,
                    period_start: sub.current_period_start,
                    period_end: sub.current_period_end,
                    total_allowed: sub.plan_minutes,
                },
            )
            .await?
        }
    };

    let updated = QuotaPeriodRepo::add_bonus(&state.pool, period.id, input.minutes)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "QuotaPeriod",
            id: period.id,
        }))?;

    tracing::info!(
        admin_id = admin.user_id,
        target_id = target.id,
        minutes = input.minutes,
        bonus = updated.bonus,
        "Bonus minutes granted"
    );

    Ok(Json(serde_json::json!({
        "data": {
            "message": format!("Added {} bonus minutes for {}", input.minutes, target.email),
            "quota": updated,
        }
    })))
}

/// POST /api/v1/admin/maintenance/quota-backfill
///
/// Create missing current-period quota rows for every user with an
/// active subscription. Returns the number of rows created.
pub async fn quota_backfill(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<serde_json::Value>> {
    let created = QuotaPeriodRepo::backfill_current(&state.pool, Utc::now()).await?;

    tracing::info!(admin_id = admin.user_id, created, "Quota backfill run");

    Ok(Json(serde_json::json!({
        "data": { "periods_created": created }
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the top-up target from `user_id` or `email`.
async fn resolve_target(state: &AppState, input: &AddBonusRequest) -> AppResult<User> {
    if let Some(id) = input.user_id {
        return UserRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id,
            }));
    }

    if let Some(email) = input.email.as_deref() {
        return UserRepo::find_by_email(&state.pool, email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with email {email} not found")));
    }

    Err(AppError::Core(CoreError::Validation(
        "Either user_id or email is required".into(),
    )))
}
