//! services/api/src/web/time.rs
//!
//! Time-entry endpoints: the running timer, manual entries, listing with
//! filters, and the aggregate statistics read.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::{caller_id, state::AppState};
use timetrack_core::ports::EntryFilter;
use timetrack_core::timer::{EntryUpdate, StartTimer};

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeQuery {
    pub action: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub limit: Option<usize>,
    pub entry_id: Option<Uuid>,
}

/// Action-qualified write: `start`, `stop` or `manual`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeActionRequest {
    pub action: String,
    pub entry_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    pub entry_id: Uuid,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /time - list entries, or read the active timer / statistics via
/// `?action=active` / `?action=stats`.
#[utoipa::path(
    get,
    path = "/time",
    responses(
        (status = 200, description = "Entries, active timer or statistics"),
        (status = 400, description = "Missing or malformed x-user-id header")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The scoping user id."),
        ("action" = Option<String>, Query, description = "`active` or `stats`.")
    )
)]
pub async fn get_time_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TimeQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;

    match query.action.as_deref() {
        Some("active") => {
            let active = state.timer.active_timer(user_id).await?;
            Ok(Json(json!({ "data": active })))
        }
        Some("stats") => {
            let stats = state.stats.time_stats(user_id).await?;
            Ok(Json(json!({ "data": stats })))
        }
        Some(other) => Err(ApiError::Validation(format!("Invalid action '{other}'"))),
        None => {
            let entries = state
                .timer
                .list_entries(
                    user_id,
                    EntryFilter {
                        start_date: query.start_date,
                        end_date: query.end_date,
                        project_id: query.project_id,
                        task_id: query.task_id,
                        limit: query.limit,
                    },
                )
                .await?;
            Ok(Json(json!({ "data": entries })))
        }
    }
}

/// POST /time - start or stop the timer, or record a manual entry.
#[utoipa::path(
    post,
    path = "/time",
    request_body = TimeActionRequest,
    responses(
        (status = 200, description = "The affected time entry"),
        (status = 400, description = "Invalid action, missing field or active-timer conflict"),
        (status = 404, description = "No active timer to stop")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The scoping user id.")
    )
)]
pub async fn time_action_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<TimeActionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;

    let entry = match req.action.as_str() {
        "start" => {
            state
                .timer
                .start_timer(
                    user_id,
                    StartTimer {
                        task_id: req.task_id,
                        project_id: req.project_id,
                        description: req.description,
                    },
                )
                .await?
        }
        "stop" => {
            let entry_id = req
                .entry_id
                .ok_or_else(|| ApiError::Validation("Missing entryId".to_string()))?;
            state.timer.stop_timer(user_id, entry_id).await?
        }
        "manual" => {
            let start_time = req
                .start_time
                .ok_or_else(|| ApiError::Validation("Missing startTime".to_string()))?;
            let end_time = req
                .end_time
                .ok_or_else(|| ApiError::Validation("Missing endTime".to_string()))?;
            state
                .timer
                .create_manual_entry(
                    user_id,
                    start_time,
                    end_time,
                    StartTimer {
                        task_id: req.task_id,
                        project_id: req.project_id,
                        description: req.description,
                    },
                )
                .await?
        }
        other => return Err(ApiError::Validation(format!("Invalid action '{other}'"))),
    };

    Ok(Json(json!({ "data": entry })))
}

/// PUT /time - partial update of an entry; the duration follows moved
/// endpoints automatically.
pub async fn update_entry_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;
    let entry = state
        .timer
        .update_entry(
            user_id,
            req.entry_id,
            EntryUpdate {
                description: req.description,
                start_time: req.start_time,
                end_time: req.end_time,
                task_id: req.task_id,
                project_id: req.project_id,
            },
        )
        .await?;
    Ok(Json(json!({ "data": entry })))
}

/// DELETE /time?entryId= - remove an entry, returning the deleted record.
pub async fn delete_entry_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TimeQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;
    let entry_id = query
        .entry_id
        .ok_or_else(|| ApiError::Validation("Missing entryId".to_string()))?;
    let entry = state.timer.delete_entry(user_id, entry_id).await?;
    Ok(Json(json!({ "data": entry })))
}
