//! crates/timetrack_core/src/tasks.rs
//!
//! Task CRUD and the status machine. Any status may move to any other;
//! the only stateful edge is the first transition into `Done`, which
//! stamps `completed_at` once and for all.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Priority, Task, TaskStatus};
use crate::ports::{EntityStore, PortError, PortResult, TaskFilter};

/// Fields accepted when creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update for a task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

pub struct TaskService {
    store: Arc<dyn EntityStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Creates a task, defaulting to `Todo` status and `Medium` priority.
    pub async fn create_task(&self, user_id: Uuid, new: NewTask) -> PortResult<Task> {
        if new.title.trim().is_empty() {
            return Err(PortError::Invalid("title must not be empty".into()));
        }
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            user_id,
            title: new.title,
            description: new.description,
            status: new.status.unwrap_or(TaskStatus::Todo),
            priority: new.priority.unwrap_or(Priority::Medium),
            project_id: new.project_id,
            due_date: new.due_date,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_task(task).await
    }

    /// Applies a partial update. Entering `Done` from any other status
    /// stamps `completed_at`; once set it is never recomputed or cleared.
    pub async fn update_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        update: TaskUpdate,
    ) -> PortResult<Task> {
        let task = self
            .store
            .get_task(user_id, task_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Task".into()))?;

        let status = update.status.unwrap_or(task.status);
        let completed_at =
            if status == TaskStatus::Done && task.status != TaskStatus::Done {
                Some(Utc::now())
            } else {
                task.completed_at
            };

        let updated = Task {
            title: update.title.unwrap_or(task.title),
            description: update.description.or(task.description),
            status,
            priority: update.priority.unwrap_or(task.priority),
            project_id: update.project_id.or(task.project_id),
            due_date: update.due_date.or(task.due_date),
            completed_at,
            updated_at: Utc::now(),
            ..task
        };
        self.store.update_task(updated).await
    }

    /// Deletes a task, returning the removed record for confirmation.
    pub async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> PortResult<Task> {
        self.store
            .delete_task(user_id, task_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Task".into()))
    }

    pub async fn get_task(&self, user_id: Uuid, task_id: Uuid) -> PortResult<Task> {
        self.store
            .get_task(user_id, task_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Task".into()))
    }

    /// Filtered listing, ordered by status ascending, then priority
    /// descending, then newest first.
    pub async fn get_tasks(&self, user_id: Uuid, filter: TaskFilter) -> PortResult<Vec<Task>> {
        self.store.list_tasks(user_id, &filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> TaskService {
        TaskService::new(Arc::new(MemoryStore::new()))
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            project_id: None,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_todo_and_medium() {
        let tasks = service();
        let task = tasks
            .create_task(Uuid::new_v4(), new_task("write report"))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.completed_at.is_none());
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let tasks = service();
        let err = tasks
            .create_task(Uuid::new_v4(), new_task("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
    }

    #[tokio::test]
    async fn completed_at_is_stamped_once_on_the_done_edge() {
        let tasks = service();
        let user = Uuid::new_v4();
        let task = tasks.create_task(user, new_task("ship it")).await.unwrap();

        let done = tasks
            .update_task(
                user,
                task.id,
                TaskUpdate {
                    status: Some(TaskStatus::Done),
                    ..TaskUpdate::default()
                },
            )
            .await
            .unwrap();
        let stamped = done.completed_at.expect("completed_at set on DONE edge");

        // Re-marking DONE, or touching another field, leaves the stamp.
        let again = tasks
            .update_task(
                user,
                task.id,
                TaskUpdate {
                    status: Some(TaskStatus::Done),
                    title: Some("ship it now".into()),
                    ..TaskUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(again.completed_at, Some(stamped));

        // Leaving DONE does not clear it either.
        let reopened = tasks
            .update_task(
                user,
                task.id,
                TaskUpdate {
                    status: Some(TaskStatus::Todo),
                    ..TaskUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(reopened.completed_at, Some(stamped));
    }

    #[tokio::test]
    async fn updating_an_unknown_task_reports_not_found() {
        let tasks = service();
        let err = tasks
            .update_task(Uuid::new_v4(), Uuid::new_v4(), TaskUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_honours_filters() {
        let tasks = service();
        let user = Uuid::new_v4();
        let project = Uuid::new_v4();

        tasks.create_task(user, new_task("a")).await.unwrap();
        tasks
            .create_task(
                user,
                NewTask {
                    priority: Some(Priority::High),
                    project_id: Some(project),
                    ..new_task("b")
                },
            )
            .await
            .unwrap();

        let all = tasks.get_tasks(user, TaskFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let high = tasks
            .get_tasks(
                user,
                TaskFilter {
                    priority: Some(Priority::High),
                    ..TaskFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].project_id, Some(project));
    }

    #[tokio::test]
    async fn delete_returns_the_removed_record() {
        let tasks = service();
        let user = Uuid::new_v4();
        let task = tasks.create_task(user, new_task("done soon")).await.unwrap();

        let deleted = tasks.delete_task(user, task.id).await.unwrap();
        assert_eq!(deleted.id, task.id);
        let err = tasks.delete_task(user, task.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
