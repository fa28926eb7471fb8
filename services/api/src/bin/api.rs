//! services/api/src/bin/api.rs

use std::sync::Arc;

use api_lib::{
    adapters::TelegramBotAdapter,
    config::Config,
    error::ApiError,
    web::{self, state::AppState},
};
use axum::http::{
    header::{HeaderName, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use timetrack_core::MemoryStore;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    if config.bot_token.is_none() {
        warn!("BOT_TOKEN is not set; /auth and bot replies will fail until it is configured");
    }

    // --- 2. Build the Store and Adapters ---
    let store = Arc::new(MemoryStore::new());
    let bot = Arc::new(TelegramBotAdapter::new(config.bot_token.clone()));

    // --- 3. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(store, bot, config.clone()));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static("x-user-id"),
        ]);

    let app = web::router(app_state).layer(cors);

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
