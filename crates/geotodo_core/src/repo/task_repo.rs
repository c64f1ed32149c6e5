//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/update/delete/list over the `tasks` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate before touching SQL.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `update_task` is one id-indexed statement that returns the stored row.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskPatch, TaskValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, title, description, created_at, due_at, latitude, longitude";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    AlreadyExists(TaskId),
    InvalidData(String),
    /// Connection was not migrated to the schema this binary expects.
    SchemaNotReady {
        found: u32,
        expected: u32,
    },
}

impl RepoError {
    /// Returns whether the failure came from the storage layer rather than
    /// from caller input.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Db(_) | Self::InvalidData(_) | Self::SchemaNotReady { .. }
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "task already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "task database schema is at version {found}, expected {expected}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Ordering applied to task lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskSort {
    /// Latest due date first.
    #[default]
    DueDateDesc,
    DueDateAsc,
    /// Most recently created first.
    CreatedDesc,
}

impl TaskSort {
    fn order_by_sql(self) -> &'static str {
        match self {
            Self::DueDateDesc => "due_at DESC, created_at DESC, id ASC",
            Self::DueDateAsc => "due_at ASC, created_at DESC, id ASC",
            Self::CreatedDesc => "created_at DESC, id ASC",
        }
    }

    /// In-memory comparator matching the SQL ordering of this sort.
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        let primary = match self {
            Self::DueDateDesc => b.due_at.cmp(&a.due_at),
            Self::DueDateAsc => a.due_at.cmp(&b.due_at),
            Self::CreatedDesc => Ordering::Equal,
        };
        primary
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub sort: TaskSort,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<Task>;
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Binds to a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `SchemaNotReady` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let found = schema_version(conn)?;
        let expected = latest_version();
        if found != expected {
            return Err(RepoError::SchemaNotReady { found, expected });
        }
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<Task> {
        task.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                created_at,
                due_at,
                latitude,
                longitude
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                task.created_at,
                task.due_at,
                task.latitude,
                task.longitude,
            ],
        );

        match inserted {
            Ok(_) => Ok(task.clone()),
            Err(err) if is_constraint_violation(&err) => Err(RepoError::AlreadyExists(task.id)),
            Err(err) => Err(err.into()),
        }
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<Task> {
        patch.validate()?;

        let location = patch.location;
        let mut stmt = self.conn.prepare(&format!(
            "UPDATE tasks
             SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                due_at = COALESCE(?3, due_at),
                latitude = CASE WHEN ?4 = 1 THEN ?5 ELSE latitude END,
                longitude = CASE WHEN ?4 = 1 THEN ?6 ELSE longitude END
             WHERE id = ?7
             RETURNING {TASK_COLUMNS};"
        ))?;

        let mut rows = stmt.query(params![
            patch.title.as_deref(),
            patch.description.as_deref(),
            patch.due_at,
            i64::from(location.is_some()),
            location.flatten().map(|value| value.latitude),
            location.flatten().map(|value| value.longitude),
            id.to_string(),
        ])?;

        let updated = match rows.next()? {
            Some(row) => parse_task_row(row)?,
            None => return Err(RepoError::NotFound(id)),
        };
        Ok(updated)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY {}",
            query.sort.order_by_sql()
        );
        let mut bind_values: Vec<Value> = Vec::new();

        match (query.limit, query.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(Value::Integer(i64::from(limit)));
                bind_values.push(Value::Integer(i64::from(offset)));
            }
            (None, 0) => {}
            (None, offset) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{id_text}` in tasks.id")))?;

    let task = Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        due_at: row.get("due_at")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
    };
    task.validate()
        .map_err(|err| RepoError::InvalidData(format!("task {id}: {err}")))?;
    Ok(task)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::TaskSort;
    use crate::model::task::Task;
    use std::cmp::Ordering;

    #[test]
    fn due_desc_breaks_ties_on_newest_creation() {
        let older = Task::new("older", "", 100, Some(5_000));
        let newer = Task::new("newer", "", 200, Some(5_000));
        assert_eq!(TaskSort::DueDateDesc.compare(&newer, &older), Ordering::Less);

        let later_due = Task::new("later", "", 0, Some(9_000));
        assert_eq!(
            TaskSort::DueDateDesc.compare(&later_due, &newer),
            Ordering::Less
        );
        assert_eq!(
            TaskSort::DueDateAsc.compare(&later_due, &newer),
            Ordering::Greater
        );
    }
}
