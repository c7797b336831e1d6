use super::{PersistenceError, PersistenceResult, TaskStore};
use crate::project::{ProjectInfo, ProjectSnapshot};
use crate::task::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

const PROJECT_ROW_MARKER: &str = "__project__";

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &ProjectSnapshot,
    path: P,
) -> PersistenceResult<()> {
    super::validate_snapshot(snapshot)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snapshot)?;
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectSnapshot> {
    let file = File::open(path)?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(file)?;
    super::validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    name: String,
    assignee: String,
    start_date: String,
    end_date: String,
    color: String,
    #[serde(default)]
    project_json: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            assignee: task.assignee.clone(),
            start_date: format_date(task.start_date),
            end_date: format_date(task.end_date),
            color: task.color.clone(),
            project_json: String::new(),
        }
    }
}

impl TaskCsvRecord {
    fn project_row(project: &ProjectInfo) -> PersistenceResult<Self> {
        Ok(Self {
            id: PROJECT_ROW_MARKER.to_string(),
            project_json: serde_json::to_string(project)?,
            ..Self::default()
        })
    }

    fn is_project_row(&self) -> bool {
        !self.project_json.trim().is_empty()
    }

    fn into_task(self) -> PersistenceResult<Task> {
        if self.is_project_row() {
            return Err(PersistenceError::InvalidData(
                "project row cannot be converted to task".into(),
            ));
        }
        let start = parse_date(&self.start_date)?;
        let end = parse_date(&self.end_date)?;
        let mut task = Task::new(self.id, self.name, start, end).with_color(self.color);
        if !self.assignee.trim().is_empty() {
            task.assignee = self.assignee;
        }
        Ok(task)
    }
}

pub fn save_snapshot_to_csv<P: AsRef<Path>>(
    snapshot: &ProjectSnapshot,
    path: P,
) -> PersistenceResult<()> {
    super::validate_snapshot(snapshot)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(TaskCsvRecord::project_row(&snapshot.project)?)?;
    for task in &snapshot.tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_snapshot_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectSnapshot> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    let mut project: Option<ProjectInfo> = None;
    for record in reader.deserialize::<TaskCsvRecord>() {
        let record = record?;
        if record.is_project_row() {
            if project.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple project rows".into(),
                ));
            }
            project = Some(serde_json::from_str(&record.project_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid project json: {err}"))
            })?);
            continue;
        }
        tasks.push(record.into_task()?);
    }

    let snapshot = ProjectSnapshot::new(project.unwrap_or_default(), tasks);
    super::validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

/// JSON document on disk. A missing file loads as "nothing stored".
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonFileStore {
    fn save_snapshot(&self, snapshot: &ProjectSnapshot) -> PersistenceResult<()> {
        save_snapshot_to_json(snapshot, &self.path)
    }

    fn load_snapshot(&self) -> PersistenceResult<Option<ProjectSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        load_snapshot_from_json(&self.path).map(Some)
    }
}

/// CSV file with one project row followed by one row per task.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for CsvFileStore {
    fn save_snapshot(&self, snapshot: &ProjectSnapshot) -> PersistenceResult<()> {
        save_snapshot_to_csv(snapshot, &self.path)
    }

    fn load_snapshot(&self) -> PersistenceResult<Option<ProjectSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        load_snapshot_from_csv(&self.path).map(Some)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}
