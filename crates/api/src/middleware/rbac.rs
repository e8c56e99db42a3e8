//! Role gating on top of [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cleo_core::error::CoreError;
use cleo_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that additionally demands the `admin` role.
///
/// Authentication failures reject with 401 as usual; a valid token with
/// any other role rejects with 403 before the handler body runs.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
