//! Quota-period entity models.

use cleo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `quota_periods` table.
///
/// `used + remaining == total_allowed` holds for the base pool at all
/// times; `bonus` is the separate top-up pool consumed first.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuotaPeriod {
    pub id: DbId,
    pub user_id: DbId,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub total_allowed: i64,
    pub remaining: i64,
    pub used: i64,
    pub bonus: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QuotaPeriod {
    /// The balance shown to users: base remaining plus bonus.
    pub fn minutes_remaining(&self) -> i64 {
        self.remaining + self.bonus
    }
}

/// DTO for lazily creating the current period from a subscription.
#[derive(Debug, Clone)]
pub struct CreateQuotaPeriod {
    pub user_id: DbId,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub total_allowed: i64,
}
