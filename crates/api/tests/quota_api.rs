//! Endpoint tests for quota checking, session logging, and admin top-up.
//!
//! These run over the real router (full middleware stack) against a real
//! database via `#[sqlx::test]`.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use cleo_api::auth::jwt::generate_access_token;
use cleo_core::roles::{ROLE_ADMIN, ROLE_STUDENT};
use cleo_db::models::subscription::{CreateSubscription, SUBSCRIPTION_ACTIVE};
use cleo_db::models::user::CreateUser;
use cleo_db::repositories::{ConversationRepo, RoleRepo, SubscriptionRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seed a user with the given role and mint a Bearer token for them.
async fn seed_user(pool: &PgPool, email: &str, role_name: &str) -> (i64, String) {
    let role = RoleRepo::find_by_name(pool, role_name)
        .await
        .unwrap()
        .expect("role is seeded");
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

    let token = generate_access_token(user.id, role_name, &common::test_config().jwt).unwrap();
    (user.id, token)
}

/// Give the user an active subscription covering now.
async fn seed_subscription(pool: &PgPool, user_id: i64, plan_minutes: i64) {
    let now = Utc::now();
    SubscriptionRepo::create(
        pool,
        &CreateSubscription {
            user_id,
            status: SUBSCRIPTION_ACTIVE.to_string(),
            plan_minutes,
            current_period_start: now - Duration::days(1),
            current_period_end: now + Duration::days(29),
        },
    )
    .await
    .unwrap();
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Quota check
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_quota_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/quota/check")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_quota_blocked_without_subscription(pool: PgPool) {
    let (_, token) = seed_user(&pool, "nosub@cleo.test", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    let response = app.oneshot(get("/api/v1/quota/check", &token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["can_start"], false);
    assert_eq!(json["minutes_remaining"], 0);
    assert!(json["quota_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_quota_lazily_creates_period(pool: PgPool) {
    let (user_id, token) = seed_user(&pool, "sub@cleo.test", ROLE_STUDENT).await;
    seed_subscription(&pool, user_id, 120).await;
    let app = common::build_test_app(pool);

    let response = app
        .clone()
        .oneshot(get("/api/v1/quota/check", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["can_start"], true);
    assert_eq!(json["minutes_remaining"], 120);
    let quota_id = json["quota_id"].as_i64().expect("quota id assigned");

    // The second check reuses the same period row.
    let again = app.oneshot(get("/api/v1/quota/check", &token)).await.unwrap();
    let json = body_json(again).await;
    assert_eq!(json["quota_id"].as_i64(), Some(quota_id));
}

// ---------------------------------------------------------------------------
// Session logging
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn log_session_charges_and_rejects_replay(pool: PgPool) {
    let (user_id, token) = seed_user(&pool, "logger@cleo.test", ROLE_STUDENT).await;
    seed_subscription(&pool, user_id, 120).await;
    let conversation = ConversationRepo::create(&pool, user_id, None).await.unwrap();
    let app = common::build_test_app(pool);

    // Create the current quota period via the check endpoint.
    app.clone()
        .oneshot(get("/api/v1/quota/check", &token))
        .await
        .unwrap();

    let report = serde_json::json!({
        "conversation_id": conversation.id,
        "duration_seconds": 250,
        "was_interrupted": false,
        "session_start": Utc::now() - Duration::seconds(250),
        "idempotency_key": "api-test-session-1",
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/sessions/log", &token, report.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    // 250 seconds bills as 5 whole minutes.
    assert_eq!(json["data"]["minutes_charged"], 5);
    assert_eq!(json["data"]["minutes_remaining"], 115);

    // Replaying the same idempotency key must not double-charge.
    let replay = app
        .clone()
        .oneshot(post_json("/api/v1/sessions/log", &token, report))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::CONFLICT);

    let check = app.oneshot(get("/api/v1/quota/check", &token)).await.unwrap();
    let json = body_json(check).await;
    assert_eq!(json["minutes_remaining"], 115);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn log_session_rejects_non_positive_duration(pool: PgPool) {
    let (user_id, token) = seed_user(&pool, "zero@cleo.test", ROLE_STUDENT).await;
    seed_subscription(&pool, user_id, 120).await;
    let conversation = ConversationRepo::create(&pool, user_id, None).await.unwrap();
    let app = common::build_test_app(pool);

    let response = app
        .oneshot(post_json(
            "/api/v1/sessions/log",
            &token,
            serde_json::json!({
                "conversation_id": conversation.id,
                "duration_seconds": 0,
                "session_start": Utc::now(),
                "idempotency_key": "api-test-zero",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn log_session_rejects_foreign_conversation(pool: PgPool) {
    let (owner_id, _) = seed_user(&pool, "owner@cleo.test", ROLE_STUDENT).await;
    let (intruder_id, intruder_token) =
        seed_user(&pool, "intruder@cleo.test", ROLE_STUDENT).await;
    seed_subscription(&pool, intruder_id, 120).await;
    let conversation = ConversationRepo::create(&pool, owner_id, None).await.unwrap();
    let app = common::build_test_app(pool);

    let response = app
        .oneshot(post_json(
            "/api/v1/sessions/log",
            &intruder_token,
            serde_json::json!({
                "conversation_id": conversation.id,
                "duration_seconds": 60,
                "session_start": Utc::now(),
                "idempotency_key": "api-test-foreign",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Admin top-up
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn add_bonus_requires_admin_role(pool: PgPool) {
    let (_, token) = seed_user(&pool, "student@cleo.test", ROLE_STUDENT).await;
    let app = common::build_test_app(pool);

    let response = app
        .oneshot(post_json(
            "/api/v1/admin/quota/bonus",
            &token,
            serde_json::json!({ "email": "student@cleo.test", "minutes": 5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn add_bonus_grants_minutes_by_email(pool: PgPool) {
    let (_, admin_token) = seed_user(&pool, "admin@cleo.test", ROLE_ADMIN).await;
    let (target_id, _) = seed_user(&pool, "target@cleo.test", ROLE_STUDENT).await;
    seed_subscription(&pool, target_id, 10).await;
    let app = common::build_test_app(pool);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/admin/quota/bonus",
            &admin_token,
            serde_json::json!({ "email": "target@cleo.test", "minutes": 5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["quota"]["bonus"], 5);
    assert_eq!(json["data"]["quota"]["total_allowed"], 15);
    assert_eq!(json["data"]["quota"]["remaining"], 10);

    // Unknown target is a 404, invalid amount a 400.
    let missing = app
        .clone()
        .oneshot(post_json(
            "/api/v1/admin/quota/bonus",
            &admin_token,
            serde_json::json!({ "email": "ghost@cleo.test", "minutes": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let invalid = app
        .oneshot(post_json(
            "/api/v1/admin/quota/bonus",
            &admin_token,
            serde_json::json!({ "email": "target@cleo.test", "minutes": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn quota_backfill_reports_created_count(pool: PgPool) {
    let (_, admin_token) = seed_user(&pool, "admin2@cleo.test", ROLE_ADMIN).await;
    let (target_id, _) = seed_user(&pool, "target2@cleo.test", ROLE_STUDENT).await;
    seed_subscription(&pool, target_id, 60).await;
    let app = common::build_test_app(pool);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/admin/maintenance/quota-backfill",
            &admin_token,
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["periods_created"], 1);

    let again = app
        .oneshot(post_json(
            "/api/v1/admin/maintenance/quota-backfill",
            &admin_token,
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    let json = body_json(again).await;
    assert_eq!(json["data"]["periods_created"], 0);
}
