//! Session-log entity models (append-only consumption ledger).

use cleo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `session_logs` table. Immutable once inserted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionLog {
    pub id: DbId,
    pub user_id: DbId,
    pub conversation_id: DbId,
    pub quota_period_id: DbId,
    pub session_start: Timestamp,
    pub session_end: Timestamp,
    pub duration_seconds: i64,
    pub minutes_charged: i64,
    pub was_interrupted: bool,
    pub deducted_from_quota: bool,
    pub ai_cost_estimate: f64,
    pub idempotency_key: String,
    pub created_at: Timestamp,
}

/// DTO for recording a completed session.
#[derive(Debug, Clone)]
pub struct CreateSessionLog {
    pub user_id: DbId,
    pub conversation_id: DbId,
    pub quota_period_id: DbId,
    pub session_start: Timestamp,
    pub session_end: Timestamp,
    pub duration_seconds: i64,
    pub minutes_charged: i64,
    pub was_interrupted: bool,
    pub ai_cost_estimate: f64,
    pub idempotency_key: String,
}
