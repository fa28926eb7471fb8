pub mod domain;
pub mod ports;
pub mod projects;
pub mod stats;
pub mod store;
pub mod tasks;
pub mod timer;

pub use domain::{
    Priority, Project, ProjectStats, Task, TaskStatus, TimeEntry, TimeStats, User,
};
pub use ports::{BotGateway, EntityStore, EntryFilter, PortError, PortResult, TaskFilter};
pub use projects::{NewProject, ProjectService, ProjectUpdate};
pub use stats::StatsService;
pub use store::MemoryStore;
pub use tasks::{NewTask, TaskService, TaskUpdate};
pub use timer::{EntryUpdate, StartTimer, TimerService};
