//! User entity models. The auth provider owns identity; this row is the
//! local anchor for quota ownership and role gating.

use cleo_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: Option<String>,
    pub role_id: DbId,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a user (provisioning sync and test seeding).
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub display_name: Option<String>,
    pub role_id: DbId,
}
