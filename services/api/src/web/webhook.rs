//! services/api/src/web/webhook.rs
//!
//! The Telegram webhook endpoint. Whatever happens inside, the reply to
//! Telegram is always `{ok: true}` or `{ok: false}`; the platform's own
//! error codes are never propagated back.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::bot::{self, Update};
use crate::web::state::AppState;

/// POST /webhook - receive one Telegram update and dispatch it.
pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<Update>,
) -> impl IntoResponse {
    match bot::handle_update(&state, update).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))),
        Err(err) => {
            error!("webhook error: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": "Internal server error" })),
            )
        }
    }
}

/// GET /webhook - liveness probe used when wiring up the webhook.
pub async fn webhook_status_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Telegram webhook is active",
    }))
}
