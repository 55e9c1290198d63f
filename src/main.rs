mod auth;
mod availability;
mod booking;
mod config;
mod db;
mod error;
mod gateway;
mod middleware;
mod models;
mod notify;
mod payment;
mod routes;
mod store;

use std::sync::Arc;

use crate::{
    auth::Credentials,
    config::Config,
    gateway::{DisabledGateway, PaymentGateway, StripeGateway},
    models::AppState,
    notify::{LogNotifier, MailgunNotifier, Notifier},
    store::{MemoryStore, PgStore, Store},
};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use axum::http::header;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Config::from_env()?;

    let store: Arc<dyn Store> = match cfg.database_url.as_deref() {
        Some(url) => Arc::new(PgStore::new(db::connect_pg(url).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store with the default catalog");
            Arc::new(MemoryStore::with_catalog(models::default_catalog()))
        }
    };

    let http = reqwest::Client::new();

    let notifier: Arc<dyn Notifier> = match cfg.mail.clone() {
        Some(mail) => Arc::new(MailgunNotifier::new(http.clone(), mail)),
        None => Arc::new(LogNotifier),
    };

    let gateway: Arc<dyn PaymentGateway> = match cfg.stripe_secret_key.clone() {
        Some(key) => Arc::new(StripeGateway::new(http.clone(), key)),
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set; payment intents are disabled");
            Arc::new(DisabledGateway)
        }
    };

    let state = AppState {
        store,
        credentials: Arc::new(Credentials::new(
            &cfg.access_token_secret,
            chrono::Duration::minutes(cfg.token_ttl_minutes),
        )),
        notifier,
        gateway,
    };

    // Browser clients call the API cross-origin with bearer tokens.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Doctors portal listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
