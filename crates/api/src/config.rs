use crate::auth::jwt::JwtConfig;

/// Server settings, read once at startup.
///
/// Every field except the JWT secret has a local-development default;
/// production deployments override through the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins (comma-separated in `CORS_ORIGINS`).
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Estimated AI cost per billed minute of voice tutoring, in dollars.
    /// Feeds the per-session cost estimate only, never quota arithmetic.
    pub ai_cost_per_minute: f64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Environment variables and their defaults:
    ///
    /// | Variable                  | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `CLEO_AI_COST_PER_MINUTE` | `0.06`                  |
    ///
    /// Unparseable values panic; startup is the right time to find out.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let ai_cost_per_minute: f64 = std::env::var("CLEO_AI_COST_PER_MINUTE")
            .unwrap_or_else(|_| "0.06".into())
            .parse()
            .expect("CLEO_AI_COST_PER_MINUTE must be a valid f64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            ai_cost_per_minute,
            jwt: JwtConfig::from_env(),
        }
    }
}
