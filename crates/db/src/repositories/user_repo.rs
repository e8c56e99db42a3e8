//! Repository for the `users` table.
//!
//! Identity itself lives with the external auth provider; these rows
//! exist for quota ownership and for resolving admin top-up targets.

use cleo_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, display_name, role_id, is_active, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a user row (provisioning sync and test seeding).
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, display_name, role_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
    }

    /// Look a user up by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look a user up by email. Admin top-ups usually address their
    /// target this way rather than by id.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}
