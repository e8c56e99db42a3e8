//! HS256 access-token handling.
//!
//! The identity provider mints tokens with the shared secret; this
//! service only verifies them. A generator is kept alongside for
//! operational tooling and for integration tests, which need to mint
//! tokens for seeded users.

use cleo_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's internal database id.
    pub sub: DbId,
    /// Role name, e.g. `"admin"` or `"student"`.
    pub role: String,
    /// Expiry (Unix seconds).
    pub exp: i64,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Token id (UUID v4), for audit trails.
    pub jti: String,
}

/// Signing/verification settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access-token lifetime in minutes.
    pub access_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;

impl JwtConfig {
    /// Read `JWT_SECRET` (required, non-empty) and
    /// `JWT_ACCESS_EXPIRY_MINS` (default 15) from the environment.
    ///
    /// # Panics
    ///
    /// Panics when `JWT_SECRET` is unset or empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Mint an access token for a user.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: iat + config.access_token_expiry_mins * 60,
        iat,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry, returning the claims on success.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
        }
    }

    #[test]
    fn round_trips_claims() {
        let token = generate_access_token(42, "student", &config()).unwrap();
        let claims = validate_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "student");
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = generate_access_token(42, "student", &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            access_token_expiry_mins: 15,
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(validate_token("not-a-token", &config()).is_err());
    }
}
