use geotodo_core::db::open_db_in_memory;
use geotodo_core::{
    Coordinate, RepoError, SqliteTaskRepository, Task, TaskListQuery, TaskPatch, TaskRepository,
    TaskSort, TaskValidationError,
};
use uuid::Uuid;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const T0: i64 = 1_700_000_000_000;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("See a doctor", "Take the Bus 123", T0, None);
    let stored = repo.create_task(&task).unwrap();
    assert_eq!(stored, task);

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded.title, "See a doctor");
    assert_eq!(loaded.description, "Take the Bus 123");
    assert_eq!(loaded.created_at, T0);
    assert_eq!(loaded.due_at, T0 + DAY_MS);
    assert_eq!(loaded.coordinate(), None);
}

#[test]
fn coordinates_roundtrip_exactly() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut task = Task::new("Pick up parcel", "", T0, None);
    task.set_coordinate(Some(Coordinate::new(25.033_964_123_456, 121.564_468_987_654)));
    repo.create_task(&task).unwrap();

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    let coordinate = loaded.coordinate().unwrap();
    assert!((coordinate.latitude - 25.033_964_123_456).abs() < 1e-12);
    assert!((coordinate.longitude - 121.564_468_987_654).abs() < 1e-12);
}

#[test]
fn create_duplicate_id_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("once", "", T0, None);
    repo.create_task(&task).unwrap();

    let err = repo.create_task(&task).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists(id) if id == task.id));
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let blank = Task::new("  ", "", T0, None);
    let err = repo.create_task(&blank).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::BlankTitle)
    ));

    let task = Task::new("valid", "", T0, None);
    repo.create_task(&task).unwrap();
    let patch = TaskPatch {
        location: Some(Some(Coordinate::new(0.0, 200.0))),
        ..TaskPatch::default()
    };
    let err = repo.update_task(task.id, &patch).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::LongitudeOutOfRange(_))
    ));
    assert_eq!(repo.get_task(task.id).unwrap().unwrap(), task);
}

#[test]
fn update_changes_only_targeted_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut task = Task::new("draft", "original description", T0, Some(T0 + DAY_MS));
    task.set_coordinate(Some(Coordinate::new(48.8566, 2.3522)));
    repo.create_task(&task).unwrap();

    let patch = TaskPatch {
        title: Some("final".to_string()),
        due_at: Some(T0 + 3 * DAY_MS),
        ..TaskPatch::default()
    };
    let updated = repo.update_task(task.id, &patch).unwrap();

    assert_eq!(updated.id, task.id);
    assert_eq!(updated.title, "final");
    assert_eq!(updated.due_at, T0 + 3 * DAY_MS);
    assert_eq!(updated.description, "original description");
    assert_eq!(updated.created_at, T0);
    assert_eq!(updated.coordinate(), Some(Coordinate::new(48.8566, 2.3522)));
    assert_eq!(repo.get_task(task.id).unwrap().unwrap(), updated);
}

#[test]
fn update_can_set_and_clear_location() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("walk", "", T0, None);
    repo.create_task(&task).unwrap();

    let set = TaskPatch {
        location: Some(Some(Coordinate::new(-33.8688, 151.2093))),
        ..TaskPatch::default()
    };
    let updated = repo.update_task(task.id, &set).unwrap();
    assert_eq!(updated.coordinate(), Some(Coordinate::new(-33.8688, 151.2093)));

    let clear = TaskPatch {
        location: Some(None),
        ..TaskPatch::default()
    };
    let cleared = repo.update_task(task.id, &clear).unwrap();
    assert_eq!(cleared.latitude, None);
    assert_eq!(cleared.longitude, None);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    let patch = TaskPatch {
        title: Some("ghost".to_string()),
        ..TaskPatch::default()
    };
    let err = repo.update_task(missing, &patch).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn delete_removes_row_and_second_delete_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("temporary", "", T0, None);
    repo.create_task(&task).unwrap();

    repo.delete_task(task.id).unwrap();
    assert!(repo.get_task(task.id).unwrap().is_none());

    let err = repo.delete_task(task.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == task.id));
}

#[test]
fn list_sorts_by_due_date_descending_by_default() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    repo.create_task(&Task::new("See a doctor", "", T0, Some(T0 + DAY_MS)))
        .unwrap();
    repo.create_task(&Task::new("Pay bills", "", T0, Some(T0 + 2 * DAY_MS)))
        .unwrap();
    repo.create_task(&Task::new("Renew passport", "", T0, Some(T0 + 30 * DAY_MS)))
        .unwrap();

    let listed = titles(&repo.list_tasks(&TaskListQuery::default()).unwrap());
    assert_eq!(listed, vec!["Renew passport", "Pay bills", "See a doctor"]);

    let ascending = TaskListQuery {
        sort: TaskSort::DueDateAsc,
        ..TaskListQuery::default()
    };
    assert_eq!(
        titles_of(&repo, &ascending),
        vec!["See a doctor", "Pay bills", "Renew passport"]
    );
}

#[test]
fn list_paginates_and_breaks_due_date_ties_on_creation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    repo.create_task(&Task::new("older", "", T0, Some(T0 + DAY_MS)))
        .unwrap();
    repo.create_task(&Task::new("newer", "", T0 + 10, Some(T0 + DAY_MS)))
        .unwrap();
    repo.create_task(&Task::new("latest due", "", T0, Some(T0 + 5 * DAY_MS)))
        .unwrap();

    let first_page = TaskListQuery {
        limit: Some(2),
        ..TaskListQuery::default()
    };
    assert_eq!(titles_of(&repo, &first_page), vec!["latest due", "newer"]);

    let rest = TaskListQuery {
        offset: 2,
        ..TaskListQuery::default()
    };
    assert_eq!(titles_of(&repo, &rest), vec!["older"]);

    let by_creation = TaskListQuery {
        sort: TaskSort::CreatedDesc,
        limit: Some(1),
        ..TaskListQuery::default()
    };
    assert_eq!(titles_of(&repo, &by_creation), vec!["newer"]);
}

#[test]
fn corrupted_rows_surface_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO tasks (id, title, description, created_at, due_at)
         VALUES ('not-a-uuid', 'broken', '', 1, 2);",
        [],
    )
    .unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo.list_tasks(&TaskListQuery::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert!(err.is_persistence());
}

fn titles_of(repo: &SqliteTaskRepository<'_>, query: &TaskListQuery) -> Vec<String> {
    titles(&repo.list_tasks(query).unwrap())
}

fn titles(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|task| task.title.clone()).collect()
}
