//! crates/timetrack_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations such as a
//! storage engine or the Telegram Bot API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Priority, Project, Task, TaskStatus, TimeEntry, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// `NotFound` deliberately covers both "no such entity" and "entity owned by
/// another user" so cross-user probing cannot distinguish the two.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Entity Store Port
//=========================================================================================

/// Filters for listing time entries. All fields are optional and combined
/// with logical AND; `start_date`/`end_date` bound the entry `start_time`.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub limit: Option<usize>,
}

/// Filters for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<Uuid>,
}

/// The storage port. One trait, one swappable back-end; every lookup and
/// mutation is scoped by `(user_id, id)`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // --- Users ---

    /// Inserts the profile, or updates the existing record with the same
    /// `telegram_id` (preserving its id and `created_at`).
    async fn upsert_user(&self, user: User) -> PortResult<User>;

    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> PortResult<Option<User>>;

    // --- Projects ---

    async fn insert_project(&self, project: Project) -> PortResult<Project>;

    async fn get_project(&self, user_id: Uuid, project_id: Uuid) -> PortResult<Option<Project>>;

    /// Replaces the stored record; `NotFound` if absent or not owned.
    async fn update_project(&self, project: Project) -> PortResult<Project>;

    async fn delete_project(&self, user_id: Uuid, project_id: Uuid) -> PortResult<Option<Project>>;

    /// All projects for the user, newest first. Archived projects are
    /// included; callers filter.
    async fn list_projects(&self, user_id: Uuid) -> PortResult<Vec<Project>>;

    /// Clears the weak `project_id` reference on the user's tasks and
    /// entries. Used when a project is hard-deleted.
    async fn detach_project(&self, user_id: Uuid, project_id: Uuid) -> PortResult<()>;

    // --- Tasks ---

    async fn insert_task(&self, task: Task) -> PortResult<Task>;

    async fn get_task(&self, user_id: Uuid, task_id: Uuid) -> PortResult<Option<Task>>;

    async fn update_task(&self, task: Task) -> PortResult<Task>;

    async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> PortResult<Option<Task>>;

    async fn list_tasks(&self, user_id: Uuid, filter: &TaskFilter) -> PortResult<Vec<Task>>;

    // --- Time entries ---

    /// Inserts an entry with `end_time = None`, failing with `Conflict` if
    /// the user already has one. The check and the insert are atomic with
    /// respect to other store calls, which is what keeps the single-active-
    /// timer invariant under concurrent starts.
    async fn create_running_entry(&self, entry: TimeEntry) -> PortResult<TimeEntry>;

    /// Inserts a completed (manual) entry. Does not look at the running
    /// timer; manual entries coexist with it.
    async fn insert_entry(&self, entry: TimeEntry) -> PortResult<TimeEntry>;

    async fn get_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<Option<TimeEntry>>;

    async fn update_entry(&self, entry: TimeEntry) -> PortResult<TimeEntry>;

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<Option<TimeEntry>>;

    /// The user's running timer, if any.
    async fn find_active_entry(&self, user_id: Uuid) -> PortResult<Option<TimeEntry>>;

    async fn list_entries(&self, user_id: Uuid, filter: &EntryFilter) -> PortResult<Vec<TimeEntry>>;
}

//=========================================================================================
// Chat Gateway Port
//=========================================================================================

/// An inline keyboard button that opens the mini-app at a URL.
#[derive(Debug, Clone)]
pub struct WebAppButton {
    pub label: String,
    pub url: String,
}

/// Outbound side of the chat platform: everything the bot command handlers
/// need in order to reply.
#[async_trait]
pub trait BotGateway: Send + Sync {
    /// Sends a Markdown-formatted message, optionally with an inline
    /// keyboard of web-app buttons.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[WebAppButton],
    ) -> PortResult<()>;
}
