//! Repository for the `session_logs` table.

use sqlx::PgPool;

use crate::models::quota_period::QuotaPeriod;
use crate::models::session_log::{CreateSessionLog, SessionLog};
use crate::repositories::QuotaPeriodRepo;

/// Column list for `session_logs` queries.
const COLUMNS: &str = "id, user_id, conversation_id, quota_period_id, session_start, \
                       session_end, duration_seconds, minutes_charged, was_interrupted, \
                       deducted_from_quota, ai_cost_estimate, idempotency_key, created_at";

/// Writes the append-only consumption ledger. The only code path that
/// decrements a quota period.
pub struct SessionLogRepo;

impl SessionLogRepo {
    /// Insert the immutable session log and apply its quota deduction in
    /// one transaction, so a ledger row without its matching deduction
    /// (or vice versa) cannot exist.
    ///
    /// A duplicate `idempotency_key` violates
    /// `uq_session_logs_idempotency_key` before anything is charged;
    /// callers map that to a conflict response.
    pub async fn record_and_charge(
        pool: &PgPool,
        input: &CreateSessionLog,
    ) -> Result<(SessionLog, QuotaPeriod), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            "INSERT INTO session_logs \
                 (user_id, conversation_id, quota_period_id, session_start, session_end, \
                  duration_seconds, minutes_charged, was_interrupted, deducted_from_quota, \
                  ai_cost_estimate, idempotency_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9, $10) \
             RETURNING {COLUMNS}"
        );
        let log = sqlx::query_as::<_, SessionLog>(&insert)
            .bind(input.user_id)
            .bind(input.conversation_id)
            .bind(input.quota_period_id)
            .bind(input.session_start)
            .bind(input.session_end)
            .bind(input.duration_seconds)
            .bind(input.minutes_charged)
            .bind(input.was_interrupted)
            .bind(input.ai_cost_estimate)
            .bind(&input.idempotency_key)
            .fetch_one(&mut *tx)
            .await?;

        let period =
            QuotaPeriodRepo::charge(&mut *tx, input.quota_period_id, input.minutes_charged).await?;

        tx.commit().await?;
        Ok((log, period))
    }
}
