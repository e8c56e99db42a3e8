//! Authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use cleo_core::error::CoreError;
use cleo_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller's identity, taken from the `Authorization: Bearer` header.
///
/// Listing this as a handler parameter is what makes an endpoint require
/// authentication; requests without a valid token never reach the
/// handler body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Internal database id, from the token's `sub` claim.
    pub user_id: DbId,
    /// Role name from the token's `role` claim.
    pub role: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}
