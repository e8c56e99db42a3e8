//! Subscription entity models (synced from the payment processor).

use cleo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Subscription status for which quota periods may be created.
pub const SUBSCRIPTION_ACTIVE: &str = "active";

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub plan_minutes: i64,
    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a subscription (webhook sync and test seeding).
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub user_id: DbId,
    pub status: String,
    pub plan_minutes: i64,
    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,
}
