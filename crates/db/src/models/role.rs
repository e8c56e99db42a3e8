//! Role lookup-table model, seeded by migration.

use cleo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}
