//! services/api/src/web/projects.rs
//!
//! Project endpoints: CRUD plus the per-project statistics read.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::{caller_id, state::AppState};
use timetrack_core::projects::{NewProject, ProjectUpdate};

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    pub project_id: Option<Uuid>,
    pub action: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub project_id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_archived: Option<bool>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /projects - list projects, or read one project (`?projectId=`),
/// or its rollup (`?projectId=&action=stats`).
pub async fn get_projects_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;

    if let Some(project_id) = query.project_id {
        if query.action.as_deref() == Some("stats") {
            let stats = state.stats.project_stats(user_id, project_id).await?;
            return Ok(Json(json!({ "data": stats })));
        }
        let project = state.projects.get_project(user_id, project_id).await?;
        return Ok(Json(json!({ "data": project })));
    }

    let projects = state
        .projects
        .get_projects(user_id, query.include_archived)
        .await?;
    Ok(Json(json!({ "data": projects })))
}

/// POST /projects - create a project.
pub async fn create_project_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;
    let project = state
        .projects
        .create_project(
            user_id,
            NewProject {
                name: req.name,
                description: req.description,
                color: req.color,
            },
        )
        .await?;
    Ok(Json(json!({ "data": project })))
}

/// PUT /projects - partial update, including archiving.
pub async fn update_project_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;
    let project = state
        .projects
        .update_project(
            user_id,
            req.project_id,
            ProjectUpdate {
                name: req.name,
                description: req.description,
                color: req.color,
                is_archived: req.is_archived,
            },
        )
        .await?;
    Ok(Json(json!({ "data": project })))
}

/// DELETE /projects?projectId= - hard delete, returning the removed record.
pub async fn delete_project_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = caller_id(&headers)?;
    let project_id = query
        .project_id
        .ok_or_else(|| ApiError::Validation("Missing projectId".to_string()))?;
    let project = state.projects.delete_project(user_id, project_id).await?;
    Ok(Json(json!({ "data": project })))
}
