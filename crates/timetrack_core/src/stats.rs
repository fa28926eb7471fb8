//! crates/timetrack_core/src/stats.rs
//!
//! Read-time statistics. Nothing is maintained incrementally: every call
//! recomputes from the full entry/task/project collections. Window
//! membership is judged by an entry's `start_time` rendered in the
//! server's local time zone; an entry without a duration counts as zero.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};
use uuid::Uuid;

use crate::domain::{ProjectStats, TaskStatus, TimeStats};
use crate::ports::{EntityStore, EntryFilter, PortError, PortResult, TaskFilter};

pub struct StatsService {
    store: Arc<dyn EntityStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Today / this-week / this-month totals plus task and project counts.
    pub async fn time_stats(&self, user_id: Uuid) -> PortResult<TimeStats> {
        self.time_stats_at(user_id, Local::now()).await
    }

    /// Same as [`time_stats`](Self::time_stats) with an explicit "now",
    /// which is what the tests pin down.
    pub async fn time_stats_at(
        &self,
        user_id: Uuid,
        now: DateTime<Local>,
    ) -> PortResult<TimeStats> {
        let today = now.date_naive();
        let week_start = start_of_week(today);
        let week_end = week_start + Duration::days(6);

        let entries = self
            .store
            .list_entries(user_id, &EntryFilter::default())
            .await?;

        let mut stats = TimeStats {
            today: 0,
            this_week: 0,
            this_month: 0,
            total_tasks: 0,
            completed_tasks: 0,
            active_projects: 0,
        };

        for entry in &entries {
            let date = entry.start_time.with_timezone(&Local).date_naive();
            let seconds = entry.duration.unwrap_or(0);
            if date == today {
                stats.today += seconds;
            }
            if date >= week_start && date <= week_end {
                stats.this_week += seconds;
            }
            if date.year() == today.year() && date.month() == today.month() {
                stats.this_month += seconds;
            }
        }

        let tasks = self
            .store
            .list_tasks(user_id, &TaskFilter::default())
            .await?;
        stats.total_tasks = tasks.len();
        stats.completed_tasks = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count();

        let projects = self.store.list_projects(user_id).await?;
        stats.active_projects = projects.iter().filter(|p| !p.is_archived).count();

        Ok(stats)
    }

    /// Rollup for a single project: total recorded seconds, task count and
    /// completed-task count. `NotFound` when the project is absent or not
    /// owned by the caller.
    pub async fn project_stats(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> PortResult<ProjectStats> {
        let project = self
            .store
            .get_project(user_id, project_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Project".into()))?;

        let entries = self
            .store
            .list_entries(
                user_id,
                &EntryFilter {
                    project_id: Some(project_id),
                    ..EntryFilter::default()
                },
            )
            .await?;
        let total_time = entries.iter().map(|e| e.duration.unwrap_or(0)).sum();

        let tasks = self
            .store
            .list_tasks(
                user_id,
                &TaskFilter {
                    project_id: Some(project_id),
                    ..TaskFilter::default()
                },
            )
            .await?;

        Ok(ProjectStats {
            project_id,
            project_name: project.name,
            total_time,
            tasks_count: tasks.len(),
            completed_tasks: tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Done)
                .count(),
            color: project.color,
        })
    }
}

/// The Sunday on or before the given date.
fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}
