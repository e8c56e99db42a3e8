//! Request handlers, one module per resource.

pub mod admin;
pub mod lesson_state;
pub mod quota;
pub mod session_log;
