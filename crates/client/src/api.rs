//! Typed REST client for the Cleo backend.
//!
//! Covers the three endpoints the companion needs: the pre-session quota
//! check, the debounced lesson-state save, and the end-of-session report.

use chrono::{DateTime, Utc};
use cleo_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Errors from backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Quota status as returned by `GET /api/v1/quota/check` (both the 200
/// and 403 responses carry this shape).
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaStatus {
    pub can_start: bool,
    pub minutes_remaining: i64,
    pub quota_id: Option<DbId>,
    pub message: String,
}

/// Body of `POST /api/v1/sessions/log`.
#[derive(Debug, Clone, Serialize)]
pub struct LogSessionPayload {
    pub conversation_id: DbId,
    pub duration_seconds: i64,
    pub was_interrupted: bool,
    pub session_start: DateTime<Utc>,
    pub idempotency_key: String,
}

/// Charge summary returned by the session report.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionOutcome {
    pub session_log_id: DbId,
    pub minutes_charged: i64,
    pub minutes_remaining: i64,
    pub ai_cost_estimate: f64,
}

/// Lesson progress snapshot pushed to `PUT /lessons/{id}/state`.
///
/// Also deserializable: the embedding UI feeds these to the companion as
/// JSON lines on stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonSnapshot {
    pub lesson_plan_id: Option<DbId>,
    pub active_step: i32,
    pub visible_content_ids: Vec<String>,
    pub completed_step_ids: Vec<String>,
    pub completion_percent: i16,
    pub last_step_title: Option<String>,
    pub last_content_id: Option<String>,
    pub last_assistant_message: Option<String>,
}

/// `{ "data": T }` envelope used by write endpoints.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Error body shape shared by all endpoints.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Where lesson snapshots end up. The REST client is the production
/// implementation; tests substitute an in-memory recorder.
#[async_trait::async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn save_snapshot(
        &self,
        conversation_id: DbId,
        snapshot: &LessonSnapshot,
    ) -> Result<(), ApiError>;
}

/// REST client holding the base URL and the caller's Bearer token.
pub struct ApiClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    /// Ask the backend whether a session may start. A 403 still carries a
    /// parseable quota status (blocked, zero remaining), so both outcomes
    /// return `Ok`.
    pub async fn check_quota(&self) -> Result<QuotaStatus, ApiError> {
        let url = format!("{}/api/v1/quota/check", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::FORBIDDEN {
            return Ok(response.json::<QuotaStatus>().await?);
        }
        Err(rejected(status, response).await)
    }

    /// Report a finished session and return the charge summary.
    pub async fn log_session(
        &self,
        payload: &LogSessionPayload,
    ) -> Result<SessionOutcome, ApiError> {
        let url = format!("{}/api/v1/sessions/log", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let envelope = response.json::<DataEnvelope<SessionOutcome>>().await?;
            return Ok(envelope.data);
        }
        Err(rejected(status, response).await)
    }
}

#[async_trait::async_trait]
impl SnapshotSink for ApiClient {
    async fn save_snapshot(
        &self,
        conversation_id: DbId,
        snapshot: &LessonSnapshot,
    ) -> Result<(), ApiError> {
        let url = format!("{}/api/v1/lessons/{}/state", self.base_url, conversation_id);
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(snapshot)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(rejected(status, response).await)
    }
}

/// Turn a non-success response into [`ApiError::Rejected`], salvaging the
/// server's error message when the body parses.
async fn rejected(status: reqwest::StatusCode, response: reqwest::Response) -> ApiError {
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => "unparseable error body".to_string(),
    };
    ApiError::Rejected {
        status: status.as_u16(),
        message,
    }
}
