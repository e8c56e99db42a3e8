use std::sync::Arc;

use crate::config::ServerConfig;

/// State shared with every handler through `State<AppState>`.
///
/// Cloning is cheap: the pool is internally reference-counted and the
/// config sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: cleo_db::DbPool,
    pub config: Arc<ServerConfig>,
}
