//! Lesson-state snapshot entity models.

use cleo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `lesson_states` table: the single live progress
/// checkpoint for a conversation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LessonState {
    pub id: DbId,
    pub conversation_id: DbId,
    pub user_id: DbId,
    pub lesson_plan_id: Option<DbId>,
    pub active_step: i32,
    pub visible_content_ids: serde_json::Value,
    pub completed_step_ids: serde_json::Value,
    pub completion_percent: i16,
    pub last_step_title: Option<String>,
    pub last_content_id: Option<String>,
    pub last_assistant_message: Option<String>,
    pub paused_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a snapshot. The content-id sets arrive as plain
/// string lists and are stored as JSONB arrays.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertLessonState {
    pub lesson_plan_id: Option<DbId>,
    pub active_step: i32,
    #[serde(default)]
    pub visible_content_ids: Vec<String>,
    #[serde(default)]
    pub completed_step_ids: Vec<String>,
    pub completion_percent: i16,
    pub last_step_title: Option<String>,
    pub last_content_id: Option<String>,
    pub last_assistant_message: Option<String>,
}
