//! crates/timetrack_core/src/store.rs
//!
//! The in-memory implementation of the `EntityStore` port. State lives
//! behind a single `tokio::sync::RwLock`, so every mutation is atomic with
//! respect to every other store call. Each instance is fully isolated;
//! tests construct as many as they need.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Project, Task, TimeEntry, User};
use crate::ports::{EntityStore, EntryFilter, PortError, PortResult, TaskFilter};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
    entries: HashMap<Uuid, TimeEntry>,
}

/// An explicitly owned repository object with no shared process state.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn upsert_user(&self, user: User) -> PortResult<User> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .users
            .values()
            .find(|u| u.telegram_id == user.telegram_id)
            .cloned();

        let record = match existing {
            Some(prev) => User {
                id: prev.id,
                created_at: prev.created_at,
                updated_at: Utc::now(),
                ..user
            },
            None => user,
        };
        inner.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> PortResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.telegram_id == telegram_id)
            .cloned())
    }

    async fn insert_project(&self, project: Project) -> PortResult<Project> {
        let mut inner = self.inner.write().await;
        inner.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, user_id: Uuid, project_id: Uuid) -> PortResult<Option<Project>> {
        let inner = self.inner.read().await;
        Ok(inner
            .projects
            .get(&project_id)
            .filter(|p| p.user_id == user_id)
            .cloned())
    }

    async fn update_project(&self, project: Project) -> PortResult<Project> {
        let mut inner = self.inner.write().await;
        match inner.projects.get(&project.id) {
            Some(prev) if prev.user_id == project.user_id => {
                inner.projects.insert(project.id, project.clone());
                Ok(project)
            }
            _ => Err(PortError::NotFound("Project".into())),
        }
    }

    async fn delete_project(&self, user_id: Uuid, project_id: Uuid) -> PortResult<Option<Project>> {
        let mut inner = self.inner.write().await;
        match inner.projects.get(&project_id) {
            Some(p) if p.user_id == user_id => Ok(inner.projects.remove(&project_id)),
            _ => Ok(None),
        }
    }

    async fn list_projects(&self, user_id: Uuid) -> PortResult<Vec<Project>> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn detach_project(&self, user_id: Uuid, project_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.write().await;
        for task in inner.tasks.values_mut() {
            if task.user_id == user_id && task.project_id == Some(project_id) {
                task.project_id = None;
                task.updated_at = Utc::now();
            }
        }
        for entry in inner.entries.values_mut() {
            if entry.user_id == user_id && entry.project_id == Some(project_id) {
                entry.project_id = None;
                entry.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn insert_task(&self, task: Task) -> PortResult<Task> {
        let mut inner = self.inner.write().await;
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_task(&self, user_id: Uuid, task_id: Uuid) -> PortResult<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .get(&task_id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    async fn update_task(&self, task: Task) -> PortResult<Task> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get(&task.id) {
            Some(prev) if prev.user_id == task.user_id => {
                inner.tasks.insert(task.id, task.clone());
                Ok(task)
            }
            _ => Err(PortError::NotFound("Task".into())),
        }
    }

    async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> PortResult<Option<Task>> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get(&task_id) {
            Some(t) if t.user_id == user_id => Ok(inner.tasks.remove(&task_id)),
            _ => Ok(None),
        }
    }

    async fn list_tasks(&self, user_id: Uuid, filter: &TaskFilter) -> PortResult<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| filter.priority.map_or(true, |p| t.priority == p))
            .filter(|t| filter.project_id.map_or(true, |p| t.project_id == Some(p)))
            .cloned()
            .collect();
        // Status ascending, then priority descending, then newest first.
        tasks.sort_by(|a, b| {
            a.status
                .cmp(&b.status)
                .then(b.priority.cmp(&a.priority))
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(tasks)
    }

    async fn create_running_entry(&self, entry: TimeEntry) -> PortResult<TimeEntry> {
        let mut inner = self.inner.write().await;
        let has_active = inner
            .entries
            .values()
            .any(|e| e.user_id == entry.user_id && e.is_active());
        if has_active {
            return Err(PortError::Conflict(
                "You already have an active timer. Stop it first.".into(),
            ));
        }
        inner.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn insert_entry(&self, entry: TimeEntry) -> PortResult<TimeEntry> {
        let mut inner = self.inner.write().await;
        inner.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn get_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<Option<TimeEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .get(&entry_id)
            .filter(|e| e.user_id == user_id)
            .cloned())
    }

    async fn update_entry(&self, entry: TimeEntry) -> PortResult<TimeEntry> {
        let mut inner = self.inner.write().await;
        match inner.entries.get(&entry.id) {
            Some(prev) if prev.user_id == entry.user_id => {
                inner.entries.insert(entry.id, entry.clone());
                Ok(entry)
            }
            _ => Err(PortError::NotFound("Time entry".into())),
        }
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<Option<TimeEntry>> {
        let mut inner = self.inner.write().await;
        match inner.entries.get(&entry_id) {
            Some(e) if e.user_id == user_id => Ok(inner.entries.remove(&entry_id)),
            _ => Ok(None),
        }
    }

    async fn find_active_entry(&self, user_id: Uuid) -> PortResult<Option<TimeEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .values()
            .find(|e| e.user_id == user_id && e.is_active())
            .cloned())
    }

    async fn list_entries(&self, user_id: Uuid, filter: &EntryFilter) -> PortResult<Vec<TimeEntry>> {
        let inner = self.inner.read().await;
        let mut entries: Vec<TimeEntry> = inner
            .entries
            .values()
            .filter(|e| e.user_id == user_id)
            .filter(|e| filter.start_date.map_or(true, |d| e.start_time >= d))
            .filter(|e| filter.end_date.map_or(true, |d| e.start_time <= d))
            .filter(|e| filter.project_id.map_or(true, |p| e.project_id == Some(p)))
            .filter(|e| filter.task_id.map_or(true, |t| e.task_id == Some(t)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}
