//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted by the task store.
//! - Provide creation defaults and write-time validation.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `due_at` defaults to `created_at + 24h` when not supplied.
//! - `latitude` and `longitude` are either both set or both unset.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Default distance between creation and due date.
pub const DEFAULT_DUE_OFFSET_MS: i64 = 24 * 60 * 60 * 1000;

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks degree ranges and rejects non-finite values.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(TaskValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(TaskValidationError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

/// Validation failures for task writes.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskValidationError {
    /// `title` is empty or whitespace only.
    BlankTitle,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    /// Exactly one of `latitude`/`longitude` is set.
    PartialCoordinate,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
            Self::PartialCoordinate => {
                write!(f, "latitude and longitude must be set together")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical to-do record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub due_at: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Task {
    /// Creates a task with a generated id, stamped at `created_at`.
    ///
    /// `due_at = None` falls back to one day after `created_at`.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: i64,
        due_at: Option<i64>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, description, created_at, due_at)
    }

    fn with_id(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: i64,
        due_at: Option<i64>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            created_at,
            due_at: due_at.unwrap_or_else(|| default_due_at(created_at)),
            latitude: None,
            longitude: None,
        }
    }

    /// Builds a task from a creation draft.
    pub fn from_draft(draft: NewTask, created_at: i64) -> Self {
        let mut task = Self::new(draft.title, draft.description, created_at, draft.due_at);
        task.set_coordinate(draft.location);
        task
    }

    /// Returns the attached coordinate when both components are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn set_coordinate(&mut self, coordinate: Option<Coordinate>) {
        self.latitude = coordinate.map(|value| value.latitude);
        self.longitude = coordinate.map(|value| value.longitude);
    }

    /// Validates write-time invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)?;
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Coordinate::new(latitude, longitude).validate(),
            (None, None) => Ok(()),
            _ => Err(TaskValidationError::PartialCoordinate),
        }
    }
}

/// Creation draft submitted by the editor form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    /// `None` means "one day after creation".
    pub due_at: Option<i64>,
    pub location: Option<Coordinate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn due_at(mut self, due_at: i64) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn location(mut self, coordinate: Coordinate) -> Self {
        self.location = Some(coordinate);
        self
    }
}

/// Partial update for an existing task.
///
/// Every `None` field keeps the stored value. `location` is two-level:
/// `Some(None)` clears the coordinate, `Some(Some(c))` replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<i64>,
    pub location: Option<Option<Coordinate>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_at.is_none()
            && self.location.is_none()
    }

    /// Validates only the fields the patch touches.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(Some(coordinate)) = &self.location {
            coordinate.validate()?;
        }
        Ok(())
    }

    /// Applies the patch onto an in-memory copy.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_at) = self.due_at {
            task.due_at = due_at;
        }
        if let Some(location) = self.location {
            task.set_coordinate(location);
        }
    }
}

/// Returns `created_at + 24h`, saturating at the `i64` bound.
pub fn default_due_at(created_at: i64) -> i64 {
    created_at.saturating_add(DEFAULT_DUE_OFFSET_MS)
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clocks set before the epoch read as `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::BlankTitle);
    }
    Ok(())
}
