//! Read access to the seeded `roles` lookup table.

use sqlx::PgPool;

use crate::models::role::Role;

/// Column list for `roles` queries.
const COLUMNS: &str = "id, name, created_at";

pub struct RoleRepo;

impl RoleRepo {
    /// Resolve one of the well-known role names (see `cleo_core::roles`).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
