/// Primary-key type shared by every table (Postgres `BIGSERIAL`).
pub type DbId = i64;

/// Timestamps are always UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
