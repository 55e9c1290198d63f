// src/routes/appointment_routes.rs

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    availability::compute_availability,
    error::ApiError,
    models::{AppState, TreatmentName, TreatmentOption},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointmentOptions", get(appointment_options))
        .route("/appointmentName", get(appointment_names))
}

#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    // matched verbatim against booking.appointDate
    pub date: Option<String>,
}

/* ============================================================
   GET /appointmentOptions?date=
   ============================================================ */

pub async fn appointment_options(
    State(state): State<AppState>,
    Query(q): Query<OptionsQuery>,
) -> Result<Json<Vec<TreatmentOption>>, ApiError> {
    let catalog = state.store.list_treatments().await?;

    let Some(date) = q.date else {
        return Ok(Json(catalog));
    };

    let booked = state.store.bookings_on(&date).await?;
    Ok(Json(compute_availability(&date, catalog, &booked)))
}

/* ============================================================
   GET /appointmentName
   ============================================================ */

pub async fn appointment_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<TreatmentName>>, ApiError> {
    Ok(Json(state.store.treatment_names().await?))
}
