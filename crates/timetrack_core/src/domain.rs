//! crates/timetrack_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage back-end; the serde
//! derives only fix the wire names (camelCase, SCREAMING_CASE enums)
//! used by the REST surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user profile, upserted from Telegram init data on `/auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project grouping tasks and time entries. Archiving is a soft
/// disable; deletion is hard and detaches weak references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default accent color assigned to projects created without one.
pub const DEFAULT_PROJECT_COLOR: &str = "#3B82F6";

/// Task workflow state. The derived `Ord` gives the listing order
/// (status ascending) in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

/// Task priority. Declaration order is ascending urgency; listings
/// sort this descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A unit of work, optionally attached to a project by id (weak
/// reference, not ownership).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub project_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    /// Stamped exactly once, on the first transition into `Done`.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recorded span of work. `end_time = None` marks the running
/// timer; at most one such entry exists per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Derived whole seconds, floor((end - start) / 1000 ms).
    pub duration: Option<i64>,
    pub description: Option<String>,
    pub is_manual: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeEntry {
    /// Whether this entry is the user's running timer.
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Elapsed whole seconds between two instants, truncated downward.
pub fn duration_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().div_euclid(1000)
}

/// Aggregate totals for one user, recomputed at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStats {
    /// Seconds recorded today (local calendar day).
    pub today: i64,
    /// Seconds recorded this week (Sunday-start local week).
    pub this_week: i64,
    /// Seconds recorded this month (local calendar month).
    pub this_month: i64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub active_projects: usize,
}

/// Rollup for a single project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub project_id: Uuid,
    pub project_name: String,
    pub total_time: i64,
    pub tasks_count: usize,
    pub completed_tasks: usize,
    pub color: String,
}
