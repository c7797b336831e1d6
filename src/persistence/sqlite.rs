use super::{PersistenceError, PersistenceResult, TaskStore};
use crate::project::{ProjectInfo, ProjectSnapshot};
use crate::task::Task;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};

pub struct SqliteTaskStore {
    connection: Mutex<Connection>,
}

impl SqliteTaskStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS project (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                project_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                position INTEGER NOT NULL,
                task_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }

    fn save_project(
        &self,
        tx: &rusqlite::Transaction,
        project: &ProjectInfo,
    ) -> PersistenceResult<()> {
        let json = serde_json::to_string(project)?;
        tx.execute("DELETE FROM project", [])?;
        tx.execute(
            "INSERT INTO project (id, project_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_tasks(&self, tx: &rusqlite::Transaction, tasks: &[Task]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM tasks", [])?;
        let mut stmt = tx.prepare("INSERT INTO tasks (id, position, task_json) VALUES (?1, ?2, ?3)")?;
        for (position, task) in tasks.iter().enumerate() {
            let json = serde_json::to_string(task)?;
            stmt.execute(params![task.id, position as i64, json])?;
        }
        Ok(())
    }
}

impl TaskStore for SqliteTaskStore {
    fn save_snapshot(&self, snapshot: &ProjectSnapshot) -> PersistenceResult<()> {
        super::validate_snapshot(snapshot)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        self.save_project(&tx, &snapshot.project)?;
        self.save_tasks(&tx, &snapshot.tasks)?;
        tx.commit()?;
        Ok(())
    }

    fn load_snapshot(&self) -> PersistenceResult<Option<ProjectSnapshot>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT project_json FROM project WHERE id = 1")?;
        let project_json: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(project_json) = project_json else {
            return Ok(None);
        };

        let project: ProjectInfo = serde_json::from_str(&project_json)?;

        let mut stmt = conn.prepare("SELECT task_json FROM tasks ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut tasks = Vec::new();
        for json in rows {
            let json = json?;
            let task: Task = serde_json::from_str(&json)?;
            tasks.push(task);
        }

        let snapshot = ProjectSnapshot::new(project, tasks);
        super::validate_snapshot(&snapshot)?;
        Ok(Some(snapshot))
    }
}
