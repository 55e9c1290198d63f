use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::{AppState, UserRecord};

/// Stage 2: runs [`AuthContext`] first, then requires the stored role to be admin.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user: UserRecord,
}

impl FromRequestParts<AppState> for AdminContext {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let auth = AuthContext::from_request_parts(parts, state).await?;

            let user = state
                .store
                .find_user_by_email(&auth.email)
                .await?
                .filter(UserRecord::is_admin)
                .ok_or_else(|| {
                    tracing::debug!(path = %parts.uri.path(), "admin route refused");
                    ApiError::forbidden()
                })?;

            Ok(AdminContext { user })
        }
    }
}
