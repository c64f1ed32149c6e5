//! Task list controller.
//!
//! # Responsibility
//! - Hold the in-memory task list a UI renders.
//! - Dispatch every mutation to the repository before touching memory.
//!
//! # Invariants
//! - The list is sorted by the controller's `TaskSort` after every mutation.
//! - A store or validation failure leaves the in-memory list unchanged.
//!   `NotFound` on delete additionally drops any stale in-memory copy.
//! - Only the owning thread touches the list; the controller is not shared.

use crate::model::task::{now_epoch_ms, NewTask, Task, TaskId, TaskPatch, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskListQuery, TaskRepository, TaskSort};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Controller error surfaced to UI callers.
#[derive(Debug)]
pub enum TaskListError {
    /// Target task does not exist in the store.
    NotFound(TaskId),
    /// Input rejected before persistence.
    Validation(TaskValidationError),
    /// Store failure; the operation was aborted.
    Persistence(RepoError),
}

impl Display for TaskListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Validation(err) => write!(f, "invalid task: {err}"),
            Self::Persistence(err) => write!(f, "task store failure: {err}"),
        }
    }
}

impl Error for TaskListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<RepoError> for TaskListError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Persistence(other),
        }
    }
}

pub type TaskListResult<T> = Result<T, TaskListError>;

/// In-memory ordered task list backed by a repository.
pub struct TaskListController<R: TaskRepository> {
    repo: R,
    tasks: Vec<Task>,
    sort: TaskSort,
}

impl<R: TaskRepository> TaskListController<R> {
    /// Creates an empty controller ordered by due date, latest first.
    ///
    /// Call `load()` to populate it from the store.
    pub fn new(repo: R) -> Self {
        Self::with_sort(repo, TaskSort::DueDateDesc)
    }

    pub fn with_sort(repo: R, sort: TaskSort) -> Self {
        Self {
            repo,
            tasks: Vec::new(),
            sort,
        }
    }

    /// Replaces the in-memory list with the store contents.
    pub fn load(&mut self) -> TaskListResult<usize> {
        let query = TaskListQuery {
            sort: self.sort,
            ..TaskListQuery::default()
        };
        match self.repo.list_tasks(&query) {
            Ok(tasks) => {
                self.tasks = tasks;
                info!(
                    "event=tasks_load module=task_list status=ok count={}",
                    self.tasks.len()
                );
                Ok(self.tasks.len())
            }
            Err(err) => Err(self.fail("tasks_load", None, err)),
        }
    }

    /// Current ordered list.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn sort(&self) -> TaskSort {
        self.sort
    }

    /// Persists a new task stamped with the current time.
    pub fn add_task(&mut self, draft: NewTask) -> TaskListResult<TaskId> {
        self.add_task_at(draft, now_epoch_ms())
    }

    /// Persists a new task with an explicit creation timestamp.
    pub fn add_task_at(&mut self, draft: NewTask, created_at: i64) -> TaskListResult<TaskId> {
        let task = Task::from_draft(draft, created_at);
        let stored = match self.repo.create_task(&task) {
            Ok(stored) => stored,
            Err(err) => return Err(self.fail("task_add", Some(task.id), err)),
        };

        let id = stored.id;
        self.tasks.push(stored);
        self.resort();
        info!("event=task_add module=task_list status=ok task_id={id}");
        Ok(id)
    }

    /// Applies a partial update by id and returns the stored task.
    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> TaskListResult<&Task> {
        let stored = match self.repo.update_task(id, patch) {
            Ok(stored) => stored,
            Err(err) => return Err(self.fail("task_update", Some(id), err)),
        };

        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(slot) => *slot = stored,
            None => {
                warn!("event=task_update module=task_list status=resync task_id={id}");
                self.tasks.push(stored);
            }
        }
        self.resort();
        info!("event=task_update module=task_list status=ok task_id={id}");

        self.get(id).ok_or(TaskListError::NotFound(id))
    }

    /// Deletes a task by id from the store and the in-memory list.
    pub fn remove_task(&mut self, id: TaskId) -> TaskListResult<()> {
        if let Err(err) = self.repo.delete_task(id) {
            if matches!(err, RepoError::NotFound(_)) {
                self.tasks.retain(|task| task.id != id);
            }
            return Err(self.fail("task_remove", Some(id), err));
        }

        self.tasks.retain(|task| task.id != id);
        info!("event=task_remove module=task_list status=ok task_id={id}");
        Ok(())
    }

    fn resort(&mut self) {
        let sort = self.sort;
        self.tasks.sort_by(|a, b| sort.compare(a, b));
    }

    fn fail(&self, event: &str, id: Option<TaskId>, err: RepoError) -> TaskListError {
        let task_id = id.map(|value| value.to_string()).unwrap_or_default();
        if err.is_persistence() {
            error!("event={event} module=task_list status=error task_id={task_id} error={err}");
        } else {
            warn!("event={event} module=task_list status=rejected task_id={task_id} error={err}");
        }
        err.into()
    }
}
