use crate::project::ProjectSnapshot;
use crate::task::Task;
use crate::task_validation;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;
use std::sync::Mutex;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Repository injected into the planner. `load_snapshot` yields `None` when nothing has
/// been stored yet.
pub trait TaskStore {
    fn save_snapshot(&self, snapshot: &ProjectSnapshot) -> PersistenceResult<()>;
    fn load_snapshot(&self) -> PersistenceResult<Option<ProjectSnapshot>>;
}

pub fn validate_tasks(tasks: &[Task]) -> PersistenceResult<()> {
    task_validation::validate_task_collection(tasks)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub fn validate_snapshot(snapshot: &ProjectSnapshot) -> PersistenceResult<()> {
    if snapshot.project.name.trim().is_empty() {
        return Err(PersistenceError::InvalidData(
            "project name must not be empty".into(),
        ));
    }
    validate_tasks(&snapshot.tasks)
}

/// Keeps the snapshot in process memory; used by tests and the `memory` store setting.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<ProjectSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: ProjectSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }
}

impl TaskStore for MemoryStore {
    fn save_snapshot(&self, snapshot: &ProjectSnapshot) -> PersistenceResult<()> {
        validate_snapshot(snapshot)?;
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| PersistenceError::InvalidData("memory store lock poisoned".into()))?;
        *guard = Some(snapshot.clone());
        Ok(())
    }

    fn load_snapshot(&self) -> PersistenceResult<Option<ProjectSnapshot>> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|_| PersistenceError::InvalidData("memory store lock poisoned".into()))?;
        Ok(guard.clone())
    }
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    CsvFileStore, JsonFileStore, load_snapshot_from_csv, load_snapshot_from_json,
    save_snapshot_to_csv, save_snapshot_to_json,
};
