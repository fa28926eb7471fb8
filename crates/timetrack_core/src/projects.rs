//! crates/timetrack_core/src/projects.rs
//!
//! Project CRUD. Archiving is a soft disable that only affects listing
//! defaults; deletion is hard and detaches the weak `project_id`
//! references held by the owner's tasks and time entries.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Project, DEFAULT_PROJECT_COLOR};
use crate::ports::{EntityStore, PortError, PortResult};

/// Fields accepted when creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Partial update for a project. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_archived: Option<bool>,
}

pub struct ProjectService {
    store: Arc<dyn EntityStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create_project(&self, user_id: Uuid, new: NewProject) -> PortResult<Project> {
        if new.name.trim().is_empty() {
            return Err(PortError::Invalid("name must not be empty".into()));
        }
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            user_id,
            name: new.name,
            description: new.description,
            color: new.color.unwrap_or_else(|| DEFAULT_PROJECT_COLOR.into()),
            is_archived: false,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_project(project).await
    }

    pub async fn update_project(
        &self,
        user_id: Uuid,
        project_id: Uuid,
        update: ProjectUpdate,
    ) -> PortResult<Project> {
        let project = self
            .store
            .get_project(user_id, project_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Project".into()))?;

        let updated = Project {
            name: update.name.unwrap_or(project.name),
            description: update.description.or(project.description),
            color: update.color.unwrap_or(project.color),
            is_archived: update.is_archived.unwrap_or(project.is_archived),
            updated_at: Utc::now(),
            ..project
        };
        self.store.update_project(updated).await
    }

    /// Hard delete. The removed record is returned for confirmation and the
    /// owner's tasks and entries lose their reference to it.
    pub async fn delete_project(&self, user_id: Uuid, project_id: Uuid) -> PortResult<Project> {
        let project = self
            .store
            .delete_project(user_id, project_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Project".into()))?;
        self.store.detach_project(user_id, project_id).await?;
        Ok(project)
    }

    pub async fn get_project(&self, user_id: Uuid, project_id: Uuid) -> PortResult<Project> {
        self.store
            .get_project(user_id, project_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Project".into()))
    }

    /// Lists the user's projects newest first, excluding archived ones
    /// unless asked for.
    pub async fn get_projects(
        &self,
        user_id: Uuid,
        include_archived: bool,
    ) -> PortResult<Vec<Project>> {
        let mut projects = self.store.list_projects(user_id).await?;
        if !include_archived {
            projects.retain(|p| !p.is_archived);
        }
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Task, TaskStatus};
    use crate::store::MemoryStore;

    fn service() -> (ProjectService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ProjectService::new(store.clone()), store)
    }

    fn new_project(name: &str) -> NewProject {
        NewProject {
            name: name.into(),
            description: None,
            color: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_the_default_color() {
        let (projects, _) = service();
        let project = projects
            .create_project(Uuid::new_v4(), new_project("client work"))
            .await
            .unwrap();
        assert_eq!(project.color, DEFAULT_PROJECT_COLOR);
        assert!(!project.is_archived);
    }

    #[tokio::test]
    async fn archived_projects_are_hidden_by_default() {
        let (projects, _) = service();
        let user = Uuid::new_v4();
        let keep = projects.create_project(user, new_project("keep")).await.unwrap();
        let shelf = projects.create_project(user, new_project("shelf")).await.unwrap();

        projects
            .update_project(
                user,
                shelf.id,
                ProjectUpdate {
                    is_archived: Some(true),
                    ..ProjectUpdate::default()
                },
            )
            .await
            .unwrap();

        let visible = projects.get_projects(user, false).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, keep.id);

        let all = projects.get_projects(user, true).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn delete_detaches_tasks_and_returns_the_record() {
        use crate::ports::{EntityStore, TaskFilter};

        let (projects, store) = service();
        let user = Uuid::new_v4();
        let project = projects.create_project(user, new_project("doomed")).await.unwrap();

        let now = Utc::now();
        let task = store
            .insert_task(Task {
                id: Uuid::new_v4(),
                user_id: user,
                title: "orphan-to-be".into(),
                description: None,
                status: TaskStatus::Todo,
                priority: Priority::Medium,
                project_id: Some(project.id),
                due_date: None,
                completed_at: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let deleted = projects.delete_project(user, project.id).await.unwrap();
        assert_eq!(deleted.id, project.id);

        let orphan = store.get_task(user, task.id).await.unwrap().unwrap();
        assert_eq!(orphan.project_id, None);

        let listed = store.list_tasks(user, &TaskFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn cross_user_update_and_delete_report_not_found() {
        let (projects, _) = service();
        let owner = Uuid::new_v4();
        let project = projects.create_project(owner, new_project("mine")).await.unwrap();

        let intruder = Uuid::new_v4();
        let err = projects
            .update_project(intruder, project.id, ProjectUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        let err = projects.delete_project(intruder, project.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
