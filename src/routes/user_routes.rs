// src/routes/user_routes.rs

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::admin_guard::AdminContext,
    models::{AppState, InsertResult, NewUser, UpdateResult, UserRecord},
    store::StoreError,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusResponse {
    pub is_admin: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        // /users
        .route("/", get(list_users).post(register_user))
        // GET takes an email, PUT takes a user id
        .route("/admin/{email}", get(admin_status).put(make_admin))
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserRecord>>, ApiError> {
    Ok(Json(state.store.list_users().await?))
}

/// Public role probe. Unknown emails are simply not admins.
pub async fn admin_status(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatusResponse>, ApiError> {
    let user = state.store.find_user_by_email(&email).await?;
    Ok(Json(AdminStatusResponse {
        is_admin: user.as_ref().is_some_and(UserRecord::is_admin),
    }))
}

fn validate_email(email: &str) -> Result<String, ApiError> {
    let e = email.trim();
    if e.is_empty() {
        return Err(ApiError::validation("email is required"));
    }
    if !e.contains('@') {
        return Err(ApiError::validation("email must contain '@'"));
    }
    Ok(e.to_string())
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<NewUser>,
) -> Result<Json<InsertResult>, ApiError> {
    let user = NewUser {
        email: validate_email(&req.email)?,
        name: req.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
    };

    match state.store.insert_user(user).await {
        Ok(created) => {
            tracing::info!(user_id = %created.id, "user registered");
            Ok(Json(InsertResult::inserted(created.id)))
        }
        Err(StoreError::Duplicate) => Ok(Json(InsertResult::rejected("User already registered"))),
        Err(e) => Err(e.into()),
    }
}

pub async fn make_admin(
    State(state): State<AppState>,
    admin: AdminContext,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UpdateResult>, ApiError> {
    let (matched_count, modified_count) = state.store.promote_to_admin(user_id).await?;
    tracing::info!(%user_id, by = %admin.user.email, matched_count, "role promotion");

    Ok(Json(UpdateResult {
        acknowledged: true,
        matched_count,
        modified_count,
    }))
}
