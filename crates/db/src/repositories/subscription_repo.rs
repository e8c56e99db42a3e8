//! Repository for the `subscriptions` table.

use cleo_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::subscription::{CreateSubscription, Subscription, SUBSCRIPTION_ACTIVE};

/// Column list for `subscriptions` queries.
const COLUMNS: &str = "id, user_id, status, plan_minutes, current_period_start, \
                       current_period_end, created_at, updated_at";

/// Read access to payment-processor subscriptions (plus inserts for the
/// webhook sync path and test seeding).
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Insert a subscription row, returning it.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions \
                 (user_id, status, plan_minutes, current_period_start, current_period_end) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.user_id)
            .bind(&input.status)
            .bind(input.plan_minutes)
            .bind(input.current_period_start)
            .bind(input.current_period_end)
            .fetch_one(pool)
            .await
    }

    /// Find the user's active subscription whose billing period covers
    /// `at` (half-open bounds, matching quota periods).
    pub async fn find_active(
        pool: &PgPool,
        user_id: DbId,
        at: Timestamp,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions \
             WHERE user_id = $1 AND status = $2 \
               AND current_period_start <= $3 AND current_period_end > $3 \
             ORDER BY current_period_start DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .bind(SUBSCRIPTION_ACTIVE)
            .bind(at)
            .fetch_optional(pool)
            .await
    }
}
