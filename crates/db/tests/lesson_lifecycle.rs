//! Integration tests for the lesson-state snapshot lifecycle.
//!
//! - Save/load round trip (upsert semantics)
//! - Pause/resume with conversation counters
//! - Idempotent completion
//! - Explicit discard

use cleo_core::lesson::{CONVERSATION_ACTIVE, CONVERSATION_COMPLETED};
use cleo_core::roles::ROLE_STUDENT;
use cleo_db::models::lesson_state::UpsertLessonState;
use cleo_db::models::user::CreateUser;
use cleo_db::repositories::{ConversationRepo, LessonStateRepo, RoleRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_conversation(pool: &PgPool, email: &str) -> (i64, i64) {
    let role = RoleRepo::find_by_name(pool, ROLE_STUDENT)
        .await
        .unwrap()
        .expect("student role is seeded");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: None,
            role_id: role.id,
        },
    )
    .await
    .unwrap();
    let conversation = ConversationRepo::create(pool, user.id, Some(7)).await.unwrap();
    (user.id, conversation.id)
}

fn snapshot(active_step: i32, visible: &[&str], percent: i16) -> UpsertLessonState {
    UpsertLessonState {
        lesson_plan_id: Some(7),
        active_step,
        visible_content_ids: visible.iter().map(|s| s.to_string()).collect(),
        completed_step_ids: vec![],
        completion_percent: percent,
        last_step_title: Some("Fractions, part 2".to_string()),
        last_content_id: None,
        last_assistant_message: None,
    }
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_save_and_load_round_trip(pool: PgPool) {
    let (user_id, conversation_id) = seed_conversation(&pool, "save@cleo.test").await;

    assert!(LessonStateRepo::find(&pool, conversation_id)
        .await
        .unwrap()
        .is_none());

    let saved = LessonStateRepo::upsert(&pool, conversation_id, user_id, &snapshot(3, &["a", "b"], 40))
        .await
        .unwrap();
    assert_eq!(saved.active_step, 3);
    assert_eq!(saved.visible_content_ids, serde_json::json!(["a", "b"]));
    assert_eq!(saved.completion_percent, 40);
    assert!(saved.paused_at.is_none());
    assert!(saved.completed_at.is_none());

    // A later save overwrites the same row rather than creating another.
    let resaved = LessonStateRepo::upsert(&pool, conversation_id, user_id, &snapshot(4, &["a", "b", "c"], 55))
        .await
        .unwrap();
    assert_eq!(resaved.id, saved.id);
    assert_eq!(resaved.active_step, 4);

    let loaded = LessonStateRepo::find(&pool, conversation_id)
        .await
        .unwrap()
        .expect("snapshot exists");
    assert_eq!(loaded.completion_percent, 55);
}

// ---------------------------------------------------------------------------
// Pause / resume
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pause_sets_paused_at_and_counts(pool: PgPool) {
    let (user_id, conversation_id) = seed_conversation(&pool, "pause@cleo.test").await;

    let paused = LessonStateRepo::pause(&pool, conversation_id, user_id, &snapshot(2, &["a"], 25))
        .await
        .unwrap();
    assert!(paused.paused_at.is_some());

    let conversation = ConversationRepo::find_by_id(&pool, conversation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conversation.total_pauses, 1);
    assert_eq!(conversation.status, CONVERSATION_ACTIVE);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pause_resume_round_trip(pool: PgPool) {
    let (user_id, conversation_id) = seed_conversation(&pool, "resume@cleo.test").await;

    LessonStateRepo::upsert(&pool, conversation_id, user_id, &snapshot(3, &["a", "b"], 40))
        .await
        .unwrap();
    LessonStateRepo::pause(&pool, conversation_id, user_id, &snapshot(3, &["a", "b"], 40))
        .await
        .unwrap();

    let before = ConversationRepo::find_by_id(&pool, conversation_id)
        .await
        .unwrap()
        .unwrap();

    let resumed = LessonStateRepo::resume(&pool, conversation_id)
        .await
        .unwrap()
        .expect("snapshot exists");
    assert_eq!(resumed.active_step, 3);
    assert_eq!(resumed.visible_content_ids, serde_json::json!(["a", "b"]));
    assert!(resumed.paused_at.is_none());

    let after = ConversationRepo::find_by_id(&pool, conversation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.resume_count, before.resume_count + 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resume_without_snapshot(pool: PgPool) {
    let (_, conversation_id) = seed_conversation(&pool, "noresume@cleo.test").await;

    assert!(LessonStateRepo::resume(&pool, conversation_id)
        .await
        .unwrap()
        .is_none());

    // No snapshot, no resume: the counter must not move.
    let conversation = ConversationRepo::find_by_id(&pool, conversation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conversation.resume_count, 0);
}

// ---------------------------------------------------------------------------
// Complete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_complete_is_idempotent(pool: PgPool) {
    let (user_id, conversation_id) = seed_conversation(&pool, "complete@cleo.test").await;

    LessonStateRepo::pause(&pool, conversation_id, user_id, &snapshot(7, &["a"], 85))
        .await
        .unwrap();

    let first = LessonStateRepo::complete(&pool, conversation_id, user_id, &snapshot(8, &["a"], 85))
        .await
        .unwrap();
    assert_eq!(first.completion_percent, 100);
    assert!(first.paused_at.is_none());
    let completed_at = first.completed_at.expect("completion stamped");

    let conversation = ConversationRepo::find_by_id(&pool, conversation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conversation.status, CONVERSATION_COMPLETED);

    // A second complete keeps the original timestamp and terminal state.
    let second = LessonStateRepo::complete(&pool, conversation_id, user_id, &snapshot(8, &["a"], 85))
        .await
        .unwrap();
    assert_eq!(second.completion_percent, 100);
    assert!(second.paused_at.is_none());
    assert_eq!(second.completed_at, Some(completed_at));
}

// ---------------------------------------------------------------------------
// Clear
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_clear_deletes_snapshot(pool: PgPool) {
    let (user_id, conversation_id) = seed_conversation(&pool, "clear@cleo.test").await;

    LessonStateRepo::upsert(&pool, conversation_id, user_id, &snapshot(1, &[], 10))
        .await
        .unwrap();

    assert!(LessonStateRepo::delete(&pool, conversation_id).await.unwrap());
    assert!(LessonStateRepo::find(&pool, conversation_id)
        .await
        .unwrap()
        .is_none());
    assert!(!LessonStateRepo::delete(&pool, conversation_id).await.unwrap());
}
