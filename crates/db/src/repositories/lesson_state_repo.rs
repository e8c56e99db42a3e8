//! Repository for the `lesson_states` table.
//!
//! One live snapshot per conversation, upsert keyed on `conversation_id`.
//! The pause/resume/complete lifecycle also touches the parent
//! conversation row, always inside the same transaction.

use cleo_core::lesson::{COMPLETION_FULL, CONVERSATION_COMPLETED};
use cleo_core::types::DbId;
use sqlx::PgPool;

use crate::models::lesson_state::{LessonState, UpsertLessonState};

/// Column list for `lesson_states` queries.
const COLUMNS: &str = "id, conversation_id, user_id, lesson_plan_id, active_step, \
                       visible_content_ids, completed_step_ids, completion_percent, \
                       last_step_title, last_content_id, last_assistant_message, \
                       paused_at, completed_at, created_at, updated_at";

/// Shared update-set for the plain save and pause upserts.
const UPSERT_SET: &str = "lesson_plan_id = EXCLUDED.lesson_plan_id, \
                          active_step = EXCLUDED.active_step, \
                          visible_content_ids = EXCLUDED.visible_content_ids, \
                          completed_step_ids = EXCLUDED.completed_step_ids, \
                          completion_percent = EXCLUDED.completion_percent, \
                          last_step_title = EXCLUDED.last_step_title, \
                          last_content_id = EXCLUDED.last_content_id, \
                          last_assistant_message = EXCLUDED.last_assistant_message, \
                          updated_at = NOW()";

/// Provides the snapshot save/load/pause/resume/complete/clear lifecycle.
pub struct LessonStateRepo;

impl LessonStateRepo {
    /// Upsert the live snapshot for a conversation.
    pub async fn upsert(
        pool: &PgPool,
        conversation_id: DbId,
        user_id: DbId,
        input: &UpsertLessonState,
    ) -> Result<LessonState, sqlx::Error> {
        let query = format!(
            "INSERT INTO lesson_states \
                 (conversation_id, user_id, lesson_plan_id, active_step, \
                  visible_content_ids, completed_step_ids, completion_percent, \
                  last_step_title, last_content_id, last_assistant_message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (conversation_id) DO UPDATE SET {UPSERT_SET} \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LessonState>(&query)
            .bind(conversation_id)
            .bind(user_id)
            .bind(input.lesson_plan_id)
            .bind(input.active_step)
            .bind(serde_json::json!(input.visible_content_ids))
            .bind(serde_json::json!(input.completed_step_ids))
            .bind(input.completion_percent)
            .bind(&input.last_step_title)
            .bind(&input.last_content_id)
            .bind(&input.last_assistant_message)
            .fetch_one(pool)
            .await
    }

    /// Fetch the snapshot for a conversation, if one was ever saved.
    pub async fn find(
        pool: &PgPool,
        conversation_id: DbId,
    ) -> Result<Option<LessonState>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lesson_states WHERE conversation_id = $1");
        sqlx::query_as::<_, LessonState>(&query)
            .bind(conversation_id)
            .fetch_optional(pool)
            .await
    }

    /// Save the snapshot with `paused_at` set and bump the conversation's
    /// pause counter, transactionally.
    pub async fn pause(
        pool: &PgPool,
        conversation_id: DbId,
        user_id: DbId,
        input: &UpsertLessonState,
    ) -> Result<LessonState, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO lesson_states \
                 (conversation_id, user_id, lesson_plan_id, active_step, \
                  visible_content_ids, completed_step_ids, completion_percent, \
                  last_step_title, last_content_id, last_assistant_message, paused_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW()) \
             ON CONFLICT (conversation_id) DO UPDATE SET {UPSERT_SET}, paused_at = NOW() \
             RETURNING {COLUMNS}"
        );
        let state = sqlx::query_as::<_, LessonState>(&query)
            .bind(conversation_id)
            .bind(user_id)
            .bind(input.lesson_plan_id)
            .bind(input.active_step)
            .bind(serde_json::json!(input.visible_content_ids))
            .bind(serde_json::json!(input.completed_step_ids))
            .bind(input.completion_percent)
            .bind(&input.last_step_title)
            .bind(&input.last_content_id)
            .bind(&input.last_assistant_message)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE conversations \
             SET total_pauses = total_pauses + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(state)
    }

    /// Clear `paused_at` and bump the conversation's resume counter,
    /// returning the unpaused snapshot so the caller can restore the
    /// exact position. `None` when the conversation was never saved.
    pub async fn resume(
        pool: &PgPool,
        conversation_id: DbId,
    ) -> Result<Option<LessonState>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE lesson_states \
             SET paused_at = NULL, updated_at = NOW() \
             WHERE conversation_id = $1 \
             RETURNING {COLUMNS}"
        );
        let state = sqlx::query_as::<_, LessonState>(&query)
            .bind(conversation_id)
            .fetch_optional(&mut *tx)
            .await?;

        if state.is_some() {
            sqlx::query(
                "UPDATE conversations \
                 SET resume_count = resume_count + 1, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(state)
    }

    /// Finalize the snapshot: force full completion, set `completed_at`
    /// once (a repeat call keeps the first timestamp), clear `paused_at`,
    /// and flip the conversation status -- all transactionally.
    pub async fn complete(
        pool: &PgPool,
        conversation_id: DbId,
        user_id: DbId,
        input: &UpsertLessonState,
    ) -> Result<LessonState, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO lesson_states \
                 (conversation_id, user_id, lesson_plan_id, active_step, \
                  visible_content_ids, completed_step_ids, completion_percent, \
                  last_step_title, last_content_id, last_assistant_message, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW()) \
             ON CONFLICT (conversation_id) DO UPDATE SET {UPSERT_SET}, \
                 paused_at = NULL, \
                 completed_at = COALESCE(lesson_states.completed_at, NOW()) \
             RETURNING {COLUMNS}"
        );
        let state = sqlx::query_as::<_, LessonState>(&query)
            .bind(conversation_id)
            .bind(user_id)
            .bind(input.lesson_plan_id)
            .bind(input.active_step)
            .bind(serde_json::json!(input.visible_content_ids))
            .bind(serde_json::json!(input.completed_step_ids))
            .bind(COMPLETION_FULL)
            .bind(&input.last_step_title)
            .bind(&input.last_content_id)
            .bind(&input.last_assistant_message)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE conversations \
             SET status = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(conversation_id)
        .bind(CONVERSATION_COMPLETED)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(state)
    }

    /// Hard-delete the snapshot (explicit discard of progress).
    ///
    /// Returns `true` if a snapshot existed.
    pub async fn delete(pool: &PgPool, conversation_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lesson_states WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
