//! `cleo-client` -- headless voice-session companion.
//!
//! Runs alongside one active voice lesson, enforcing the client-side
//! session cap and reporting the elapsed time when the session ends.
//!
//! # Environment variables
//!
//! | Variable           | Required | Default         | Description                          |
//! |--------------------|----------|-----------------|--------------------------------------|
//! | `CLEO_API_URL`     | yes      | --              | Backend base URL, e.g. `http://host:3000` |
//! | `CLEO_API_TOKEN`   | yes      | --              | Bearer token for the session's user  |
//! | `CONVERSATION_ID`  | yes      | --              | Integer id of the conversation       |
//! | `SESSION_CAP_SECS` | no       | `900`           | Hard per-session cap in seconds      |
//! | `CLEO_STATE_DIR`   | no       | `.cleo-session` | Directory for local timer state      |

use std::path::PathBuf;
use std::sync::Arc;

use cleo_client::api::ApiClient;
use cleo_client::runner::SessionRunner;
use cleo_client::store::TimerStore;
use cleo_core::timer::DEFAULT_SESSION_CAP_SECS;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cleo_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_url = std::env::var("CLEO_API_URL").unwrap_or_else(|_| {
        tracing::error!("CLEO_API_URL environment variable is required");
        std::process::exit(1);
    });

    let api_token = std::env::var("CLEO_API_TOKEN").unwrap_or_else(|_| {
        tracing::error!("CLEO_API_TOKEN environment variable is required");
        std::process::exit(1);
    });

    let conversation_id: i64 = std::env::var("CONVERSATION_ID")
        .unwrap_or_else(|_| {
            tracing::error!("CONVERSATION_ID environment variable is required");
            std::process::exit(1);
        })
        .parse()
        .unwrap_or_else(|_| {
            tracing::error!("CONVERSATION_ID must be a valid integer");
            std::process::exit(1);
        });

    let cap_secs: i64 = std::env::var("SESSION_CAP_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SESSION_CAP_SECS);

    let state_dir = std::env::var("CLEO_STATE_DIR").unwrap_or_else(|_| ".cleo-session".into());

    tracing::info!(
        conversation_id,
        cap_secs,
        api_url = %api_url,
        "Starting cleo-client",
    );

    let api = Arc::new(ApiClient::new(api_url, api_token));
    let store = TimerStore::new(PathBuf::from(state_dir));

    let runner = SessionRunner::new(api, store, conversation_id, cap_secs);
    if let Err(e) = runner.run().await {
        tracing::error!(error = %e, "Session ended without a confirmed charge");
        std::process::exit(1);
    }
}
