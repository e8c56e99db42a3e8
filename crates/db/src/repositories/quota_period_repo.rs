//! Repository for the `quota_periods` table.

use cleo_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::quota_period::{CreateQuotaPeriod, QuotaPeriod};

/// Column list for `quota_periods` queries.
const COLUMNS: &str = "id, user_id, period_start, period_end, total_allowed, \
                       remaining, used, bonus, created_at, updated_at";

/// Provides allowance lookups and the irreversible balance mutations.
pub struct QuotaPeriodRepo;

impl QuotaPeriodRepo {
    /// Find the period covering `at` for a user. Period bounds are
    /// half-open: `period_start <= at < period_end`.
    pub async fn find_current(
        pool: &PgPool,
        user_id: DbId,
        at: Timestamp,
    ) -> Result<Option<QuotaPeriod>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quota_periods \
             WHERE user_id = $1 AND period_start <= $2 AND period_end > $2 \
             ORDER BY period_start DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, QuotaPeriod>(&query)
            .bind(user_id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }

    /// Create the period row if it does not exist yet, then return it.
    ///
    /// Two concurrent quota checks can race on the lazy creation; the
    /// unique constraint on (user_id, period_start) makes the loser fall
    /// through to the select.
    pub async fn find_or_create(
        pool: &PgPool,
        input: &CreateQuotaPeriod,
    ) -> Result<QuotaPeriod, sqlx::Error> {
        let insert = format!(
            "INSERT INTO quota_periods \
                 (user_id, period_start, period_end, total_allowed, remaining) \
             VALUES ($1, $2, $3, $4, $4) \
             ON CONFLICT (user_id, period_start) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, QuotaPeriod>(&insert)
            .bind(input.user_id)
            .bind(input.period_start)
            .bind(input.period_end)
            .bind(input.total_allowed)
            .fetch_optional(pool)
            .await?;

        if let Some(period) = created {
            return Ok(period);
        }

        let select = format!(
            "SELECT {COLUMNS} FROM quota_periods \
             WHERE user_id = $1 AND period_start = $2"
        );
        sqlx::query_as::<_, QuotaPeriod>(&select)
            .bind(input.user_id)
            .bind(input.period_start)
            .fetch_one(pool)
            .await
    }

    /// Add top-up minutes to the bonus pool.
    ///
    /// Also grows `total_allowed` so reporting stays consistent, but
    /// never touches `remaining` -- the displayed balance is
    /// `remaining + bonus` and crediting both would double-count.
    pub async fn add_bonus(
        pool: &PgPool,
        id: DbId,
        minutes: i64,
    ) -> Result<Option<QuotaPeriod>, sqlx::Error> {
        let query = format!(
            "UPDATE quota_periods \
             SET bonus = bonus + $2, \
                 total_allowed = total_allowed + $2, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuotaPeriod>(&query)
            .bind(id)
            .bind(minutes)
            .fetch_optional(pool)
            .await
    }

    /// Apply a bonus-first deduction of `minutes` to a period row.
    ///
    /// A single UPDATE whose right-hand sides all read the pre-update
    /// column values (PostgreSQL semantics), so concurrent charges
    /// serialize on the row and neither pool can go negative. Any
    /// shortfall beyond the two pools is absorbed.
    ///
    /// Takes an open connection so the session logger can run it inside
    /// the same transaction as the log insert.
    pub async fn charge(
        conn: &mut sqlx::PgConnection,
        id: DbId,
        minutes: i64,
    ) -> Result<QuotaPeriod, sqlx::Error> {
        let query = format!(
            "UPDATE quota_periods \
             SET used = used + LEAST(remaining, GREATEST($2 - bonus, 0)), \
                 remaining = remaining - LEAST(remaining, GREATEST($2 - bonus, 0)), \
                 bonus = bonus - LEAST(bonus, $2), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuotaPeriod>(&query)
            .bind(id)
            .bind(minutes)
            .fetch_one(&mut *conn)
            .await
    }

    /// Create missing current-period rows for every user with an active
    /// subscription covering `at`. Returns the number of rows created.
    pub async fn backfill_current(pool: &PgPool, at: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO quota_periods \
                 (user_id, period_start, period_end, total_allowed, remaining) \
             SELECT s.user_id, s.current_period_start, s.current_period_end, \
                    s.plan_minutes, s.plan_minutes \
             FROM subscriptions s \
             WHERE s.status = 'active' \
               AND s.current_period_start <= $1 AND s.current_period_end > $1 \
               AND NOT EXISTS ( \
                   SELECT 1 FROM quota_periods q \
                   WHERE q.user_id = s.user_id \
                     AND q.period_start <= $1 AND q.period_end > $1) \
             ON CONFLICT (user_id, period_start) DO NOTHING",
        )
        .bind(at)
        .execute(pool)
        .await?;

        let created = result.rows_affected();
        tracing::info!(created, "Quota period backfill finished");
        Ok(created)
    }
}
