//! Session runner: the 1 Hz loop that drives the soft-cap timer.
//!
//! Lifecycle of one run:
//!
//! 1. Ask the backend whether a session may start (quota check).
//! 2. Restore previously accumulated time from the local store, start
//!    the timer, and tick once per second.
//! 3. While running, accept lesson snapshots as JSON lines on stdin from
//!    the embedding UI and push them through the debounced autosaver.
//! 4. End on the hard cap (limit reached) or on Ctrl-C (interrupted).
//! 5. Persist the accumulated time, report the session to the backend,
//!    and clear the local entry once the charge is confirmed.
//!
//! The timer is advisory: the backend charges from the reported duration,
//! and nothing here is trusted for billing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cleo_core::timer::SessionTimer;
use cleo_core::types::DbId;
use tokio::io::AsyncBufReadExt;
use uuid::Uuid;

use crate::api::{ApiClient, ApiError, LessonSnapshot, LogSessionPayload, SnapshotSink};
use crate::autosave::{LessonAutosaver, DEFAULT_DEBOUNCE};
use crate::store::TimerStore;

/// Drives one voice session to completion.
pub struct SessionRunner {
    api: Arc<ApiClient>,
    store: TimerStore,
    conversation_id: DbId,
    cap_secs: i64,
}

impl SessionRunner {
    pub fn new(
        api: Arc<ApiClient>,
        store: TimerStore,
        conversation_id: DbId,
        cap_secs: i64,
    ) -> Self {
        Self {
            api,
            store,
            conversation_id,
            cap_secs,
        }
    }

    /// Run the session until the cap is hit or the process is told to
    /// stop, then report it. Returns the error of the final report if it
    /// could not be delivered.
    pub async fn run(self) -> Result<(), ApiError> {
        // Refuse to start when the backend says so.
        let quota = self.api.check_quota().await?;
        if !quota.can_start {
            tracing::error!(message = %quota.message, "Quota check refused session start");
            return Ok(());
        }
        tracing::info!(
            minutes_remaining = quota.minutes_remaining,
            "Quota check passed, starting session"
        );

        let restored = self.store.load(self.conversation_id).unwrap_or(0);
        let mut timer = SessionTimer::restore(self.cap_secs, restored);
        if !timer.start(Utc::now()) {
            tracing::error!("Session cap already reached before start");
            return Ok(());
        }

        // One idempotency key per run: a retried report cannot double-charge.
        let idempotency_key = Uuid::new_v4().to_string();

        let sink: Arc<dyn SnapshotSink> = self.api.clone();
        let autosaver = LessonAutosaver::spawn(sink, self.conversation_id, DEFAULT_DEBOUNCE);

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        let mut stdin_open = true;

        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        let mut warned = false;
        let mut interrupted = false;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snap = timer.tick(Utc::now());
                    if snap.show_warning && !warned {
                        warned = true;
                        tracing::warn!(
                            remaining_secs = snap.remaining_secs,
                            "Session approaching its time limit"
                        );
                    }
                    if snap.limit_reached {
                        tracing::info!("Session time limit reached");
                        break;
                    }
                }
                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => match serde_json::from_str::<LessonSnapshot>(&line) {
                        Ok(snapshot) => autosaver.submit(snapshot).await,
                        Err(e) => {
                            tracing::warn!(error = %e, "Malformed lesson snapshot ignored");
                        }
                    },
                    Ok(None) => {
                        // UI side closed the pipe; the timer keeps running.
                        stdin_open = false;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Stopped reading lesson snapshots");
                        stdin_open = false;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Session interrupted, winding down");
                    interrupted = true;
                    break;
                }
            }
        }

        // Flush any pending snapshot before reporting.
        autosaver.close().await;

        let now = Utc::now();
        let elapsed = timer.pause(now);
        self.store.save(self.conversation_id, elapsed);

        let outcome = self
            .api
            .log_session(&LogSessionPayload {
                conversation_id: self.conversation_id,
                duration_seconds: elapsed,
                was_interrupted: interrupted,
                session_start: now - chrono::Duration::seconds(elapsed),
                idempotency_key,
            })
            .await?;

        tracing::info!(
            session_log_id = outcome.session_log_id,
            minutes_charged = outcome.minutes_charged,
            minutes_remaining = outcome.minutes_remaining,
            ai_cost_estimate = outcome.ai_cost_estimate,
            "Session charged"
        );

        // The session is fully accounted; the local entry has served its
        // purpose.
        self.store.clear(self.conversation_id);
        Ok(())
    }
}
