use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, models::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/jwt", get(issue_token))
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub access_token: String,
}

/// Tokens are only handed out to registered emails; anyone else gets 403 and an empty token.
pub async fn issue_token(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
) -> Result<Response, ApiError> {
    let email = q.email.as_deref().map(str::trim).unwrap_or_default();

    let token = if email.is_empty() {
        None
    } else {
        state.credentials.issue(state.store.as_ref(), email).await?
    };

    let resp = match token {
        Some(access_token) => Json(TokenResponse {
            message: None,
            access_token,
        })
        .into_response(),
        None => (
            StatusCode::FORBIDDEN,
            Json(TokenResponse {
                message: Some("Unauthorized access".into()),
                access_token: String::new(),
            }),
        )
            .into_response(),
    };
    Ok(resp)
}
