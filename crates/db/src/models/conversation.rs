//! Conversation entity models.

use cleo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `conversations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Conversation {
    pub id: DbId,
    pub user_id: DbId,
    pub lesson_plan_id: Option<DbId>,
    pub status: String,
    pub total_pauses: i64,
    pub resume_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
