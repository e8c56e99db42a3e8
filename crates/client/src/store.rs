//! Local persistence for the session timer.
//!
//! One small JSON file per conversation under the state directory,
//! holding the accumulated seconds. Written on pause, removed on reset,
//! read on mount so a process restart does not lose in-session time.
//!
//! Failures here are **gracefully degrading**: they are logged and the
//! session continues unsaved instead of aborting.

use std::fs;
use std::path::PathBuf;

use cleo_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Persisted shape of the timer state.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedTimer {
    accumulated_secs: i64,
}

/// File-backed store for accumulated session seconds.
pub struct TimerStore {
    dir: PathBuf,
}

impl TimerStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, conversation_id: DbId) -> PathBuf {
        self.dir.join(format!("voice-timer-{conversation_id}.json"))
    }

    /// Load the accumulated seconds for a conversation, if previously
    /// saved. Unreadable or corrupt files count as "nothing saved".
    pub fn load(&self, conversation_id: DbId) -> Option<i64> {
        let path = self.path(conversation_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to read timer state");
                return None;
            }
        };
        match serde_json::from_str::<PersistedTimer>(&raw) {
            Ok(persisted) => Some(persisted.accumulated_secs),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Corrupt timer state ignored");
                None
            }
        }
    }

    /// Persist the accumulated seconds. Returns `false` (after logging)
    /// when the write failed and the session is running unsaved.
    pub fn save(&self, conversation_id: DbId, accumulated_secs: i64) -> bool {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::error!(error = %e, dir = %self.dir.display(), "Failed to create state dir");
            return false;
        }
        let body = serde_json::to_string(&PersistedTimer { accumulated_secs })
            .expect("PersistedTimer is always serialisable");
        match fs::write(self.path(conversation_id), body) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist timer state");
                false
            }
        }
    }

    /// Remove the persisted entry for a conversation (timer reset or a
    /// fully accounted session). Missing files are fine.
    pub fn clear(&self, conversation_id: DbId) {
        if let Err(e) = fs::remove_file(self.path(conversation_id)) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, "Failed to remove timer state");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
