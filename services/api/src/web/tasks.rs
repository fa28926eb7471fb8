//! services/api/src/web/tasks.rs
//!
//! Task endpoints: CRUD with status/priority/project filters.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::{caller_id, state::AppState};
use timetrack_core::domain::{Priority, TaskStatus};
use timetrack_core::ports::TaskFilter;
use timetrack_core::tasks::{NewTask, TaskUpdate};

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub task_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub task_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /tasks - list tasks with optional filters, or read one (`?taskId=`).
pub async fn get_tasks_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TaskQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;

    if let Some(task_id) = query.task_id {
        let task = state.tasks.get_task(user_id, task_id).await?;
        return Ok(Json(json!({ "data": task })));
    }

    let tasks = state
        .tasks
        .get_tasks(
            user_id,
            TaskFilter {
                status: query.status,
                priority: query.priority,
                project_id: query.project_id,
            },
        )
        .await?;
    Ok(Json(json!({ "data": tasks })))
}

/// POST /tasks - create a task (defaults: TODO status, MEDIUM priority).
pub async fn create_task_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;
    let task = state
        .tasks
        .create_task(
            user_id,
            NewTask {
                title: req.title,
                description: req.description,
                status: req.status,
                priority: req.priority,
                project_id: req.project_id,
                due_date: req.due_date,
            },
        )
        .await?;
    Ok(Json(json!({ "data": task })))
}

/// PUT /tasks - partial update; entering DONE stamps `completedAt` once.
pub async fn update_task_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;
    let task = state
        .tasks
        .update_task(
            user_id,
            req.task_id,
            TaskUpdate {
                title: req.title,
                description: req.description,
                status: req.status,
                priority: req.priority,
                project_id: req.project_id,
                due_date: req.due_date,
            },
        )
        .await?;
    Ok(Json(json!({ "data": task })))
}

/// DELETE /tasks?taskId= - remove a task, returning the deleted record.
pub async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TaskQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;
    let task_id = query
        .task_id
        .ok_or_else(|| ApiError::Validation("Missing taskId".to_string()))?;
    let task = state.tasks.delete_task(user_id, task_id).await?;
    Ok(Json(json!({ "data": task })))
}
