//! services/api/src/web/mod.rs
//!
//! Route table and shared handler plumbing for the REST surface.

pub mod auth;
pub mod projects;
pub mod state;
pub mod tasks;
pub mod time;
pub mod webhook;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::ApiError;
use state::AppState;

/// Builds the application router. CORS and tracing layers are added by the
/// binary; tests drive this router directly.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth", post(auth::authenticate_handler))
        .route(
            "/projects",
            get(projects::get_projects_handler)
                .post(projects::create_project_handler)
                .put(projects::update_project_handler)
                .delete(projects::delete_project_handler),
        )
        .route(
            "/tasks",
            get(tasks::get_tasks_handler)
                .post(tasks::create_task_handler)
                .put(tasks::update_task_handler)
                .delete(tasks::delete_task_handler),
        )
        .route(
            "/time",
            get(time::get_time_handler)
                .post(time::time_action_handler)
                .put(time::update_entry_handler)
                .delete(time::delete_entry_handler),
        )
        .route(
            "/webhook",
            post(webhook::webhook_handler).get(webhook::webhook_status_handler),
        )
        .with_state(state)
}

/// The caller's identity, read from the `x-user-id` header.
///
/// Every entity route is scoped by this id; a missing or malformed header
/// is a validation failure, not an auth failure, because the id is an
/// opaque scoping key rather than a credential.
pub fn caller_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Validation("x-user-id header is required".to_string()))?;
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::Validation("Invalid x-user-id format".to_string()))
}

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::authenticate_handler,
        time::get_time_handler,
        time::time_action_handler,
    ),
    components(
        schemas(auth::AuthRequest, time::TimeActionRequest)
    ),
    tags(
        (name = "Time Tracker API", description = "API endpoints for the Telegram time-tracking mini-app.")
    )
)]
pub struct ApiDoc;
