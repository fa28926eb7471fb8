//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use timetrack_core::ports::{BotGateway, EntityStore};
use timetrack_core::{ProjectService, StatsService, TaskService, TimerService};

use crate::config::Config;

/// The shared application state, created once at startup and passed to all
/// handlers. The services share one store, so every front-end (REST and
/// bot) observes the same entities.
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub timer: TimerService,
    pub tasks: TaskService,
    pub projects: ProjectService,
    pub stats: StatsService,
    pub bot: Arc<dyn BotGateway>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EntityStore>,
        bot: Arc<dyn BotGateway>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            timer: TimerService::new(store.clone()),
            tasks: TaskService::new(store.clone()),
            projects: ProjectService::new(store.clone()),
            stats: StatsService::new(store.clone()),
            store,
            bot,
            config,
        }
    }
}
