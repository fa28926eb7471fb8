//! crates/timetrack_core/src/timer.rs
//!
//! The timer lifecycle: starting and stopping the single active timer,
//! manual entries, and time-entry CRUD. All operations are scoped by the
//! owning user; a lookup for another user's entry answers "not found".

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{duration_seconds, TimeEntry};
use crate::ports::{EntityStore, EntryFilter, PortError, PortResult};

/// Optional attachments for a started timer.
#[derive(Debug, Clone, Default)]
pub struct StartTimer {
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub description: Option<String>,
}

/// Partial update for a time entry. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub task_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

/// Enforces the at-most-one-active-timer invariant and derives durations.
///
/// Start and stop run under a per-user async mutex, so two concurrent
/// starts cannot both observe "no active timer". The store's
/// `create_running_entry` makes the same check atomically; the lock keeps
/// the invariant even across a start/stop pair.
pub struct TimerService {
    store: Arc<dyn EntityStore>,
    user_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl TimerService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks.entry(user_id).or_default().clone()
    }

    /// Starts the user's timer. Fails with `Conflict` when one is already
    /// running.
    pub async fn start_timer(&self, user_id: Uuid, params: StartTimer) -> PortResult<TimeEntry> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let now = Utc::now();
        let entry = TimeEntry {
            id: Uuid::new_v4(),
            user_id,
            task_id: params.task_id,
            project_id: params.project_id,
            start_time: now,
            end_time: None,
            duration: None,
            description: params.description,
            is_manual: false,
            created_at: now,
            updated_at: now,
        };
        let entry = self.store.create_running_entry(entry).await?;
        tracing::debug!(user_id = %user_id, entry_id = %entry.id, "timer started");
        Ok(entry)
    }

    /// Stops a running entry, stamping `end_time` and the floored elapsed
    /// seconds. A stopped or absent entry answers `NotFound`, which makes a
    /// repeated stop safe.
    pub async fn stop_timer(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<TimeEntry> {
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let entry = self
            .store
            .get_entry(user_id, entry_id)
            .await?
            .filter(TimeEntry::is_active)
            .ok_or_else(|| PortError::NotFound("No active timer".into()))?;

        let end_time = Utc::now();
        let stopped = TimeEntry {
            end_time: Some(end_time),
            duration: Some(duration_seconds(entry.start_time, end_time)),
            updated_at: end_time,
            ..entry
        };
        let stopped = self.store.update_entry(stopped).await?;
        tracing::debug!(user_id = %user_id, entry_id = %entry_id, "timer stopped");
        Ok(stopped)
    }

    /// The user's running timer, if any.
    pub async fn active_timer(&self, user_id: Uuid) -> PortResult<Option<TimeEntry>> {
        self.store.find_active_entry(user_id).await
    }

    /// Records a completed span with caller-supplied endpoints. Manual
    /// entries coexist with a running timer; only the ordering of the two
    /// instants is validated.
    pub async fn create_manual_entry(
        &self,
        user_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        params: StartTimer,
    ) -> PortResult<TimeEntry> {
        if end_time <= start_time {
            return Err(PortError::Invalid(
                "endTime must be after startTime".into(),
            ));
        }
        let now = Utc::now();
        let entry = TimeEntry {
            id: Uuid::new_v4(),
            user_id,
            task_id: params.task_id,
            project_id: params.project_id,
            start_time,
            end_time: Some(end_time),
            duration: Some(duration_seconds(start_time, end_time)),
            description: params.description,
            is_manual: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_entry(entry).await
    }

    /// Applies a partial update. The duration is recomputed whenever either
    /// endpoint changes and both ends are known afterwards.
    pub async fn update_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        update: EntryUpdate,
    ) -> PortResult<TimeEntry> {
        let entry = self
            .store
            .get_entry(user_id, entry_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Time entry".into()))?;

        let endpoints_changed = update.start_time.is_some() || update.end_time.is_some();
        let start_time = update.start_time.unwrap_or(entry.start_time);
        let end_time = update.end_time.or(entry.end_time);

        let duration = match (endpoints_changed, end_time) {
            (true, Some(end)) => {
                if end <= start_time {
                    return Err(PortError::Invalid(
                        "endTime must be after startTime".into(),
                    ));
                }
                Some(duration_seconds(start_time, end))
            }
            _ => entry.duration,
        };

        let updated = TimeEntry {
            start_time,
            end_time,
            duration,
            description: update.description.or(entry.description),
            task_id: update.task_id.or(entry.task_id),
            project_id: update.project_id.or(entry.project_id),
            updated_at: Utc::now(),
            ..entry
        };
        self.store.update_entry(updated).await
    }

    /// Deletes an entry, returning the removed record for confirmation.
    pub async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<TimeEntry> {
        self.store
            .delete_entry(user_id, entry_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Time entry".into()))
    }

    /// Entries for the user, newest first, with optional filters.
    pub async fn list_entries(
        &self,
        user_id: Uuid,
        filter: EntryFilter,
    ) -> PortResult<Vec<TimeEntry>> {
        self.store.list_entries(user_id, &filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> (TimerService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (TimerService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn start_then_stop_completes_the_entry() {
        let (timer, _) = service();
        let user = Uuid::new_v4();

        let started = timer.start_timer(user, StartTimer::default()).await.unwrap();
        assert!(started.is_active());
        assert!(!started.is_manual);

        let stopped = timer.stop_timer(user, started.id).await.unwrap();
        assert!(stopped.end_time.is_some());
        assert_eq!(stopped.duration, Some(0));
        assert!(timer.active_timer(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_start_conflicts_until_stopped() {
        let (timer, _) = service();
        let user = Uuid::new_v4();

        let first = timer.start_timer(user, StartTimer::default()).await.unwrap();
        let err = timer
            .start_timer(user, StartTimer::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));

        timer.stop_timer(user, first.id).await.unwrap();
        timer.start_timer(user, StartTimer::default()).await.unwrap();
    }

    #[tokio::test]
    async fn stopping_twice_reports_not_found() {
        let (timer, _) = service();
        let user = Uuid::new_v4();

        let entry = timer.start_timer(user, StartTimer::default()).await.unwrap();
        timer.stop_timer(user, entry.id).await.unwrap();
        let err = timer.stop_timer(user, entry.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn stop_floors_elapsed_seconds() {
        use crate::ports::EntityStore;

        let (timer, store) = service();
        let user = Uuid::new_v4();
        let now = Utc::now();

        // Back-date the running entry so the elapsed time has a sub-second
        // remainder.
        let entry = TimeEntry {
            id: Uuid::new_v4(),
            user_id: user,
            task_id: None,
            project_id: None,
            start_time: now - chrono::Duration::milliseconds(90_500),
            end_time: None,
            duration: None,
            description: None,
            is_manual: false,
            created_at: now,
            updated_at: now,
        };
        store.create_running_entry(entry.clone()).await.unwrap();

        let stopped = timer.stop_timer(user, entry.id).await.unwrap();
        assert_eq!(stopped.duration, Some(90));
    }

    #[tokio::test]
    async fn manual_entry_coexists_with_active_timer() {
        let (timer, _) = service();
        let user = Uuid::new_v4();

        timer.start_timer(user, StartTimer::default()).await.unwrap();
        let start = Utc::now() - chrono::Duration::hours(2);
        let end = start + chrono::Duration::minutes(90);
        let manual = timer
            .create_manual_entry(user, start, end, StartTimer::default())
            .await
            .unwrap();

        assert!(manual.is_manual);
        assert_eq!(manual.duration, Some(90 * 60));
        assert!(timer.active_timer(user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn manual_entry_with_inverted_times_is_rejected() {
        let (timer, _) = service();
        let user = Uuid::new_v4();
        let now = Utc::now();

        let err = timer
            .create_manual_entry(user, now, now - chrono::Duration::minutes(5), StartTimer::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
    }

    #[tokio::test]
    async fn update_recomputes_duration_when_endpoints_move() {
        let (timer, _) = service();
        let user = Uuid::new_v4();
        let start = Utc::now() - chrono::Duration::hours(3);
        let end = start + chrono::Duration::hours(1);
        let entry = timer
            .create_manual_entry(user, start, end, StartTimer::default())
            .await
            .unwrap();

        let moved = timer
            .update_entry(
                user,
                entry.id,
                EntryUpdate {
                    end_time: Some(start + chrono::Duration::minutes(30)),
                    ..EntryUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.duration, Some(30 * 60));

        // A description-only update leaves the duration alone.
        let renamed = timer
            .update_entry(
                user,
                entry.id,
                EntryUpdate {
                    description: Some("writeup".into()),
                    ..EntryUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.duration, Some(30 * 60));
        assert_eq!(renamed.description.as_deref(), Some("writeup"));
    }

    #[tokio::test]
    async fn delete_returns_the_removed_record() {
        let (timer, _) = service();
        let user = Uuid::new_v4();
        let start = Utc::now() - chrono::Duration::hours(1);
        let entry = timer
            .create_manual_entry(user, start, Utc::now(), StartTimer::default())
            .await
            .unwrap();

        let deleted = timer.delete_entry(user, entry.id).await.unwrap();
        assert_eq!(deleted.id, entry.id);

        let err = timer.delete_entry(user, entry.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn entries_of_other_users_are_invisible() {
        let (timer, _) = service();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let entry = timer.start_timer(owner, StartTimer::default()).await.unwrap();

        let err = timer.stop_timer(intruder, entry.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        let err = timer.delete_entry(intruder, entry.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_entries_filters_and_limits() {
        let (timer, _) = service();
        let user = Uuid::new_v4();
        let project = Uuid::new_v4();
        let base = Utc::now() - chrono::Duration::days(1);

        for i in 0..3 {
            let start = base + chrono::Duration::hours(i);
            timer
                .create_manual_entry(
                    user,
                    start,
                    start + chrono::Duration::minutes(10),
                    StartTimer {
                        project_id: (i == 0).then_some(project),
                        ..StartTimer::default()
                    },
                )
                .await
                .unwrap();
        }

        let all = timer.list_entries(user, EntryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].start_time > all[2].start_time);

        let scoped = timer
            .list_entries(
                user,
                EntryFilter {
                    project_id: Some(project),
                    ..EntryFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);

        let limited = timer
            .list_entries(
                user,
                EntryFilter {
                    limit: Some(2),
                    ..EntryFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }
}
