//! Repository for the `conversations` table.

use cleo_core::types::DbId;
use sqlx::PgPool;

use crate::models::conversation::Conversation;

/// Column list for `conversations` queries.
const COLUMNS: &str =
    "id, user_id, lesson_plan_id, status, total_pauses, resume_count, created_at, updated_at";

/// Provides conversation lookups and creation. The pause/resume counters
/// are bumped by `LessonStateRepo` inside its lifecycle transactions.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Create a conversation for a user, returning the full row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        lesson_plan_id: Option<DbId>,
    ) -> Result<Conversation, sqlx::Error> {
        let query = format!(
            "INSERT INTO conversations (user_id, lesson_plan_id) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(user_id)
            .bind(lesson_plan_id)
            .fetch_one(pool)
            .await
    }

    /// Fetch a conversation by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM conversations WHERE id = $1");
        sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
