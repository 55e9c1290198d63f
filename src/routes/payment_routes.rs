// src/routes/payment_routes.rs

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    gateway::to_cents,
    models::{AppState, InsertResult, NewPayment},
    payment,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/payments", post(record_payment))
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(req): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, ApiError> {
    let amount = if req.price.is_finite() { to_cents(req.price) } else { 0 };
    if amount <= 0 {
        return Err(ApiError::validation("price must be greater than zero"));
    }

    let client_secret = state.gateway.create_intent(amount, "usd").await?;
    Ok(Json(PaymentIntentResponse { client_secret }))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Json(req): Json<NewPayment>,
) -> Result<Json<InsertResult>, ApiError> {
    Ok(Json(payment::record_payment(state.store.as_ref(), req).await?))
}
