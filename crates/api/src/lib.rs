//! Cleo API server library.
//!
//! Everything the binary wires together (config, state, errors, routes,
//! auth) is public here so integration tests can build the same app.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
