//! `cleo-client` -- headless voice-session companion.
//!
//! Runs alongside one active voice lesson: drives the soft-cap session
//! timer at 1 Hz, persists accumulated time locally so a restart does not
//! lose it, debounces lesson-state snapshots before pushing them to the
//! backend, and reports the elapsed duration when the session ends. The
//! binary entrypoint lives in `main.rs`.

pub mod api;
pub mod autosave;
pub mod runner;
pub mod store;
