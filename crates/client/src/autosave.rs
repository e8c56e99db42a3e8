//! Debounced lesson-state autosave.
//!
//! UI-driven progress updates can arrive many times per second; pushing
//! each one to the backend would amplify writes badly. The autosaver
//! collapses bursts: a snapshot is flushed only after a quiet window with
//! no newer snapshot, and a newer snapshot always replaces the pending
//! one. Save failures are logged and the lesson continues unsaved.

use std::sync::Arc;
use std::time::Duration;

use cleo_core::types::DbId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{LessonSnapshot, SnapshotSink};

/// Default quiet window before a pending snapshot is flushed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// Channel capacity for pending snapshots. The worker consumes eagerly,
/// so this only bounds pathological bursts.
const QUEUE_CAPACITY: usize = 64;

/// Handle to the background autosave worker.
pub struct LessonAutosaver {
    tx: mpsc::Sender<LessonSnapshot>,
    handle: JoinHandle<()>,
}

impl LessonAutosaver {
    /// Spawn the worker for one conversation.
    pub fn spawn(
        sink: Arc<dyn SnapshotSink>,
        conversation_id: DbId,
        debounce: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = tokio::spawn(run(sink, conversation_id, debounce, rx));
        Self { tx, handle }
    }

    /// Queue a snapshot. It replaces any not-yet-flushed predecessor.
    pub async fn submit(&self, snapshot: LessonSnapshot) {
        if self.tx.send(snapshot).await.is_err() {
            tracing::warn!("Autosave worker is gone; snapshot dropped");
        }
    }

    /// Flush the pending snapshot (if any) and stop the worker.
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Autosave worker ended abnormally");
        }
    }
}

/// Worker loop: hold the latest snapshot until the quiet window elapses,
/// then push it. A closed channel flushes the pending snapshot and exits.
async fn run(
    sink: Arc<dyn SnapshotSink>,
    conversation_id: DbId,
    debounce: Duration,
    mut rx: mpsc::Receiver<LessonSnapshot>,
) {
    while let Some(mut pending) = rx.recv().await {
        let mut open = true;
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(snapshot) => pending = snapshot,
                    None => {
                        open = false;
                        break;
                    }
                },
                () = tokio::time::sleep(debounce) => break,
            }
        }

        if let Err(e) = sink.save_snapshot(conversation_id, &pending).await {
            tracing::warn!(error = %e, conversation_id, "Lesson snapshot save failed; continuing unsaved");
        }

        if !open {
            break;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use tokio::sync::Mutex;

    /// Records every flushed snapshot instead of calling the backend.
    struct RecordingSink {
        saved: Mutex<Vec<(DbId, i32)>>,
    }

    #[async_trait::async_trait]
    impl SnapshotSink for RecordingSink {
        async fn save_snapshot(
            &self,
            conversation_id: DbId,
            snapshot: &LessonSnapshot,
        ) -> Result<(), ApiError> {
            self.saved
                .lock()
                .await
                .push((conversation_id, snapshot.active_step));
            Ok(())
        }
    }

    fn snapshot(active_step: i32) -> LessonSnapshot {
        LessonSnapshot {
            lesson_plan_id: Some(7),
            active_step,
            visible_content_ids: vec!["a".into()],
            completed_step_ids: vec![],
            completion_percent: 10,
            last_step_title: None,
            last_content_id: None,
            last_assistant_message: None,
        }
    }

    #[tokio::test]
    async fn burst_collapses_to_latest_snapshot() {
        let sink = Arc::new(RecordingSink {
            saved: Mutex::new(vec![]),
        });
        let saver =
            LessonAutosaver::spawn(sink.clone(), 42, Duration::from_millis(50));

        for step in 1..=5 {
            saver.submit(snapshot(step)).await;
        }
        saver.close().await;

        let saved = sink.saved.lock().await;
        assert_eq!(saved.len(), 1, "burst must collapse into one save");
        assert_eq!(saved[0], (42, 5));
    }

    #[tokio::test]
    async fn separated_updates_each_flush() {
        let sink = Arc::new(RecordingSink {
            saved: Mutex::new(vec![]),
        });
        let saver =
            LessonAutosaver::spawn(sink.clone(), 42, Duration::from_millis(20));

        saver.submit(snapshot(1)).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        saver.submit(snapshot(2)).await;
        saver.close().await;

        let saved = sink.saved.lock().await;
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].1, 1);
        assert_eq!(saved[1].1, 2);
    }
}
