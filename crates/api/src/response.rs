//! Success-response envelope.
//!
//! Successful JSON bodies are wrapped as `{ "data": ... }` so clients can
//! tell payloads apart from the `{ "error", "code" }` failure shape
//! without inspecting the status line.

use serde::Serialize;

/// The `{ "data": T }` wrapper around a successful payload.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
