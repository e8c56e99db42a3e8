//! Handlers for the `/quota` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use cleo_core::types::{DbId, Timestamp};
use cleo_db::models::quota_period::{CreateQuotaPeriod, QuotaPeriod};
use cleo_db::repositories::{QuotaPeriodRepo, SubscriptionRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Body of `GET /quota/check`, returned for both permitted and blocked
/// outcomes (blocked responses carry it with a 403 status).
#[derive(Debug, Serialize)]
pub struct QuotaStatus {
    pub can_start: bool,
    pub minutes_remaining: i64,
    pub quota_id: Option<DbId>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<Timestamp>,
}

impl QuotaStatus {
    fn blocked(message: &str) -> Self {
        Self {
            can_start: false,
            minutes_remaining: 0,
            quota_id: None,
            message: message.to_string(),
            period_end: None,
        }
    }

    fn from_period(period: &QuotaPeriod) -> Self {
        let minutes_remaining = period.minutes_remaining();
        let can_start = minutes_remaining > 0;
        let message = if can_start {
            format!("{minutes_remaining} minutes remaining this period")
        } else {
            "Voice-minute allowance for this period is used up".to_string()
        };
        Self {
            can_start,
            minutes_remaining,
            quota_id: Some(period.id),
            message,
            period_end: Some(period.period_end),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/quota/check
///
/// Report whether the caller may start a voice session and with how much
/// allowance. Lazily creates the current quota period from the caller's
/// active subscription on first check of a billing period. Responds 200
/// when starting is permitted, 403 (with the same body shape) when not.
pub async fn check_quota(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<QuotaStatus>)> {
    let now = Utc::now();

    let mut period = QuotaPeriodRepo::find_current(&state.pool, auth.user_id, now).await?;

    if period.is_none() {
        period = match SubscriptionRepo::find_active(&state.pool, auth.user_id, now).await? {
            Some(sub) => {
                let created = QuotaPeriodRepo::find_or_create(
                    &state.pool,
                    &CreateQuotaPeriod {
                        user_id: auth.user_id,
                        period_start: sub.current_period_start,
                        period_end: sub.current_period_end,
                        total_allowed: sub.plan_minutes,
                    },
                )
                .await?;
                tracing::info!(
                    user_id = auth.user_id,
                    quota_id = created.id,
                    total_allowed = created.total_allowed,
                    "Created quota period for new billing period"
                );
                Some(created)
            }
            None => None,
        };
    }

    let status = match &period {
        Some(period) => QuotaStatus::from_period(period),
        None => QuotaStatus::blocked("No active subscription"),
    };

    let code = if status.can_start {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };
    Ok((code, Json(status)))
}
