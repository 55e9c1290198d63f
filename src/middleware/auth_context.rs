use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};

use crate::error::ApiError;
use crate::models::AppState;

/// Stage 1: a verified bearer token. Handlers that take this extractor require login.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub email: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            // Extract Authorization: Bearer <token>
            let TypedHeader(authz): TypedHeader<Authorization<Bearer>> =
                TypedHeader::from_request_parts(parts, state)
                    .await
                    .map_err(|rejection| {
                        if rejection.is_missing() {
                            ApiError::missing_credentials()
                        } else {
                            ApiError::invalid_credentials()
                        }
                    })?;

            let claims = state.credentials.verify(authz.token())?;

            Ok(AuthContext {
                email: claims.email,
            })
        }
    }
}
