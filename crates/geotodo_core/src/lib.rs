//! Core of the GeoTodo task tracker.
//! Task persistence, the ordered in-memory list, location tagging and the
//! quote of the day live here; UI shells bind to `TodoApp`.

pub mod app;
pub mod config;
pub mod db;
pub mod location;
pub mod logging;
pub mod model;
pub mod quote;
pub mod repo;
pub mod service;

pub use app::{bootstrap, AppAlert, BootstrapError, TodoApp};
pub use config::{AppConfig, ConfigError};
pub use location::{
    Accuracy, Authorization, HostLocationFeed, HostLocationSource, LocationError, LocationEvent,
    LocationProvider, LocationSink, LocationSource,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Coordinate, NewTask, Task, TaskId, TaskPatch, TaskValidationError};
pub use quote::{Quote, QuoteClient, QuoteError, QuoteReceipt, QuoteState};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskListQuery, TaskRepository, TaskSort,
};
pub use service::task_list::{TaskListController, TaskListError, TaskListResult};

/// Minimal health-check API for shell integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
