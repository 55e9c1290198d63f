use crate::models::AppState;
use axum::Router;

pub mod appointment_routes;
pub mod auth_routes;
pub mod booking_routes;
pub mod doctor_routes;
pub mod home_routes;
pub mod payment_routes;
pub mod user_routes;


pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(appointment_routes::router())
        .nest("/bookings", booking_routes::router())
        .merge(payment_routes::router())
        .merge(auth_routes::router())
        .nest("/users", user_routes::router())
        .nest("/doctors", doctor_routes::router())
        .merge(home_routes::router())
        .with_state(state)
}
