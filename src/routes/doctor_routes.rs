// src/routes/doctor_routes.rs

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::admin_guard::AdminContext,
    models::{AppState, DeleteResult, Doctor, InsertResult, NewDoctor},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_doctors).post(add_doctor))
        .route("/{doctor_id}", delete(remove_doctor))
}

pub async fn list_doctors(
    State(state): State<AppState>,
    _admin: AdminContext,
) -> Result<Json<Vec<Doctor>>, ApiError> {
    Ok(Json(state.store.list_doctors().await?))
}

fn validate_doctor(req: NewDoctor) -> Result<NewDoctor, ApiError> {
    let field = |name: &str, v: &str| {
        let v = v.trim();
        if v.is_empty() {
            Err(ApiError::validation(format!("{name} is required")))
        } else {
            Ok(v.to_string())
        }
    };

    Ok(NewDoctor {
        name: field("name", &req.name)?,
        email: field("email", &req.email)?,
        specialty: field("specialty", &req.specialty)?,
        image: req.image.filter(|s| !s.trim().is_empty()),
    })
}

pub async fn add_doctor(
    State(state): State<AppState>,
    _admin: AdminContext,
    Json(req): Json<NewDoctor>,
) -> Result<Json<InsertResult>, ApiError> {
    let doctor = state.store.insert_doctor(validate_doctor(req)?).await?;
    Ok(Json(InsertResult::inserted(doctor.id)))
}

pub async fn remove_doctor(
    State(state): State<AppState>,
    _admin: AdminContext,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<DeleteResult>, ApiError> {
    let deleted_count = state.store.delete_doctor(doctor_id).await?;
    Ok(Json(DeleteResult {
        acknowledged: true,
        deleted_count,
    }))
}
