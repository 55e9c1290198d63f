// src/routes/booking_routes.rs

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    booking,
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{AppState, Booking, InsertResult, NewBooking},
};

pub fn router() -> Router<AppState> {
    Router::new()
        // /bookings
        .route("/", get(list_bookings).post(create_booking))
        // /bookings/{booking_id}
        .route("/{booking_id}", get(get_booking))
}

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    pub email: Option<String>,
}

pub async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(q): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let rows = booking::bookings_for(state.store.as_ref(), &auth, q.email.as_deref()).await?;
    Ok(Json(rows))
}

/// Anyone holding the id may read the booking; a miss is `null`.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Option<Booking>>, ApiError> {
    Ok(Json(booking::booking_by_id(state.store.as_ref(), booking_id).await?))
}

/// A duplicate is answered 200 with `acknowledged: false` so clients can show it inline.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<NewBooking>,
) -> Result<Json<InsertResult>, ApiError> {
    let res = booking::create_booking(state.store.as_ref(), &state.notifier, req).await?;
    Ok(Json(res))
}
