//! App shell handed to UI code.
//!
//! # Responsibility
//! - Own the task list, location provider and quote state as one object.
//! - Collect background results on the owning thread through `poll()`.
//! - Turn failures into non-blocking alerts while still returning them.
//!
//! # Invariants
//! - Every mutation of shared state happens on the thread calling into
//!   `TodoApp`; background work only reaches it through channels.

use crate::config::{AppConfig, ConfigError};
use crate::db::{open_db, DbError};
use crate::location::{LocationError, LocationProvider, LocationSource};
use crate::logging::{init_logging, LoggingError};
use crate::model::task::{NewTask, Task, TaskId, TaskPatch};
use crate::quote::{QuoteClient, QuoteReceipt, QuoteState, QUOTE_ERROR_MESSAGE};
use crate::repo::task_repo::TaskRepository;
use crate::service::task_list::{TaskListController, TaskListError, TaskListResult};
use log::info;
use rusqlite::Connection;
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::runtime::Handle;

/// Launch failures raised before a `TodoApp` exists.
#[derive(Debug)]
pub enum BootstrapError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "cannot open task database: {err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

/// Applies `config` to process-wide setup and opens the task database.
///
/// Logging starts only when `log_dir` is set. The returned connection is
/// migrated and ready for `SqliteTaskRepository::try_new`.
pub fn bootstrap(config: &AppConfig) -> Result<Connection, BootstrapError> {
    config.validate().map_err(BootstrapError::Config)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).map_err(BootstrapError::Logging)?;
    }
    let conn = open_db(&config.db_path).map_err(BootstrapError::Db)?;
    info!(
        "event=bootstrap module=app status=ok logging={}",
        config.log_dir.is_some()
    );
    Ok(conn)
}

/// Non-blocking message for the UI to display once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAlert {
    QuoteUnavailable,
    /// A task operation failed; carries a user-facing message.
    Task(String),
}

impl AppAlert {
    pub fn message(&self) -> &str {
        match self {
            Self::QuoteUnavailable => QUOTE_ERROR_MESSAGE,
            Self::Task(message) => message,
        }
    }
}

/// View-model for the to-do screen.
pub struct TodoApp<R: TaskRepository> {
    tasks: TaskListController<R>,
    location: LocationProvider,
    quote_client: QuoteClient,
    quote: QuoteState,
    pending_quote: Option<QuoteReceipt>,
    alerts: VecDeque<AppAlert>,
}

impl<R: TaskRepository> TodoApp<R> {
    pub fn new(repo: R, quote_client: QuoteClient) -> Self {
        Self {
            tasks: TaskListController::new(repo),
            location: LocationProvider::new(),
            quote_client,
            quote: QuoteState::default(),
            pending_quote: None,
            alerts: VecDeque::new(),
        }
    }

    pub fn with_config(repo: R, config: &AppConfig) -> Self {
        Self::new(repo, QuoteClient::new(config.quote_endpoint.clone()))
    }

    /// Launch sequence: starts the quote fetch on `runtime`, then loads
    /// tasks from the store.
    pub fn start(&mut self, runtime: &Handle) -> TaskListResult<usize> {
        self.pending_quote = Some(self.quote_client.spawn_fetch(runtime));
        let loaded = self.tasks.load();
        self.track(loaded)
    }

    /// Subscribes to device location through `source`.
    ///
    /// Failure only means new tasks carry no coordinate.
    pub fn start_location(
        &mut self,
        source: Box<dyn LocationSource>,
    ) -> Result<(), LocationError> {
        self.location.start(source)
    }

    /// Drains location events and collects a finished quote fetch.
    ///
    /// Returns whether any UI-visible state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = self.location.pump() > 0;

        let outcome = self
            .pending_quote
            .as_mut()
            .and_then(QuoteReceipt::try_take);
        if let Some(outcome) = outcome {
            self.pending_quote = None;
            if outcome.is_err() {
                self.alerts.push_back(AppAlert::QuoteUnavailable);
            }
            self.quote.apply(outcome);
            info!(
                "event=quote_publish module=app status={}",
                if self.quote.show_error { "error" } else { "ok" }
            );
            changed = true;
        }

        changed
    }

    pub fn is_quote_pending(&self) -> bool {
        self.pending_quote.is_some()
    }

    pub fn quote(&self) -> &QuoteState {
        &self.quote
    }

    pub fn dismiss_quote_error(&mut self) {
        self.quote.dismiss_error();
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn location(&self) -> &LocationProvider {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut LocationProvider {
        &mut self.location
    }

    /// Creates a task, tagging it with the current coordinate when the
    /// draft has none.
    pub fn add_task(&mut self, mut draft: NewTask) -> TaskListResult<TaskId> {
        if draft.location.is_none() {
            draft.location = self.location.current_coordinate();
        }
        let created = self.tasks.add_task(draft);
        self.track(created)
    }

    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> TaskListResult<Task> {
        let updated = self.tasks.update_task(id, patch).map(Task::clone);
        self.track(updated)
    }

    pub fn remove_task(&mut self, id: TaskId) -> TaskListResult<()> {
        let removed = self.tasks.remove_task(id);
        self.track(removed)
    }

    /// Pops the oldest pending alert.
    pub fn take_alert(&mut self) -> Option<AppAlert> {
        self.alerts.pop_front()
    }

    fn track<T>(&mut self, result: TaskListResult<T>) -> TaskListResult<T> {
        if let Err(err) = &result {
            self.alerts.push_back(AppAlert::Task(alert_message(err)));
        }
        result
    }
}

fn alert_message(err: &TaskListError) -> String {
    match err {
        TaskListError::NotFound(_) => "This task no longer exists.".to_string(),
        TaskListError::Validation(err) => format!("Task not saved: {err}."),
        TaskListError::Persistence(_) => "Could not save your tasks. Please try again.".to_string(),
    }
}
