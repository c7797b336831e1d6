//! Application state for one open project.
//!
//! `Planner` owns the task collection, the undo log, the active gesture and the assignee
//! filter. Every write funnels through `add_task`, `update_task` and `delete_task`, which
//! validate the result and record one undo command each.

use crate::collection::TaskCollection;
use crate::gesture::{
    CellGeometry, DragTranslator, GestureMode, GestureOutcome, GesturePreview, NoCapture,
    PointerCapture, PointerPosition, shifted_range,
};
use crate::layout::{self, MonthLayout};
use crate::persistence::{PersistenceError, TaskStore};
use crate::project::{ProjectInfo, ProjectSnapshot};
use crate::task::{NewTask, Task, TaskPatch, generate_task_id};
use crate::task_validation::{self, TaskValidationError};
use crate::undo::{Command, UndoLog};
use chrono::{Duration, NaiveDate};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug)]
pub enum PlannerError {
    NotFound(String),
    Validation(TaskValidationError),
    Persistence(PersistenceError),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::NotFound(id) => write!(f, "task {id} not found"),
            PlannerError::Validation(err) => write!(f, "invalid task: {err}"),
            PlannerError::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerError::NotFound(_) => None,
            PlannerError::Validation(err) => Some(err),
            PlannerError::Persistence(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for PlannerError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistenceError> for PlannerError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Row of the sidebar task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListEntry {
    pub id: String,
    pub name: String,
    pub assignee: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i64,
    pub color: String,
}

impl From<&Task> for TaskListEntry {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            assignee: task.assignee.clone(),
            start_date: task.start_date,
            end_date: task.end_date,
            duration_days: task.duration_days(),
            color: task.color.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Planner<C: PointerCapture = NoCapture> {
    project: ProjectInfo,
    tasks: TaskCollection,
    undo: UndoLog,
    gesture: DragTranslator<C>,
    assignee_filter: Option<String>,
}

impl Planner<NoCapture> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: ProjectSnapshot) -> Result<Self, PlannerError> {
        Self::from_snapshot_with_capture(snapshot, NoCapture)
    }

    /// Loads from `store`, starting empty when nothing has been saved yet.
    pub fn open(store: &dyn TaskStore) -> Result<Self, PlannerError> {
        let snapshot = store.load_snapshot()?.unwrap_or_default();
        info!(
            "event=planner_open module=planner status=ok task_count={}",
            snapshot.tasks.len()
        );
        Self::from_snapshot(snapshot)
    }
}

impl<C: PointerCapture> Planner<C> {
    pub fn with_capture(capture: C) -> Self {
        Self {
            project: ProjectInfo::default(),
            tasks: TaskCollection::default(),
            undo: UndoLog::default(),
            gesture: DragTranslator::with_capture(capture),
            assignee_filter: None,
        }
    }

    pub fn from_snapshot_with_capture(
        snapshot: ProjectSnapshot,
        capture: C,
    ) -> Result<Self, PlannerError> {
        task_validation::validate_task_collection(&snapshot.tasks)?;
        let mut planner = Self::with_capture(capture);
        planner.project = snapshot.project;
        planner.tasks = TaskCollection::new(snapshot.tasks);
        Ok(planner)
    }

    pub fn project(&self) -> &ProjectInfo {
        &self.project
    }

    pub fn set_project(&mut self, project: ProjectInfo) {
        self.project = project;
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot::new(self.project.clone(), self.tasks.to_vec())
    }

    pub fn save(&self, store: &dyn TaskStore) -> Result<(), PlannerError> {
        store.save_snapshot(&self.snapshot())?;
        info!(
            "event=planner_save module=planner status=ok task_count={}",
            self.tasks.len()
        );
        Ok(())
    }

    /// Replaces project and tasks wholesale. The undo log is cleared and any gesture is
    /// abandoned.
    pub fn replace_snapshot(&mut self, snapshot: ProjectSnapshot) -> Result<(), PlannerError> {
        task_validation::validate_task_collection(&snapshot.tasks)?;
        self.gesture.teardown();
        self.project = snapshot.project;
        self.tasks = TaskCollection::new(snapshot.tasks);
        self.undo.clear();
        Ok(())
    }

    pub fn add_task(&mut self, data: NewTask) -> Result<Task, PlannerError> {
        let mut task = data.into_task(generate_task_id());
        while self.tasks.contains(&task.id) {
            task.id = generate_task_id();
        }
        self.insert_task(task)
    }

    /// Adds a task that already carries an id, such as one received over the wire.
    pub fn insert_task(&mut self, task: Task) -> Result<Task, PlannerError> {
        task_validation::validate_task(&task)?;
        if !self.tasks.insert(task.clone()) {
            return Err(TaskValidationError::new(format!("duplicate task id {}", task.id)).into());
        }
        self.undo.push(Command::Add {
            task_id: task.id.clone(),
        });
        info!(
            "event=task_add module=planner status=ok task_id={}",
            task.id
        );
        Ok(task)
    }

    /// Applies `patch` to the task. A patch that changes nothing records no undo entry.
    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<Task, PlannerError> {
        let previous = self
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| PlannerError::NotFound(id.to_string()))?;

        let mut updated = previous.clone();
        updated.apply_patch(patch);
        task_validation::validate_task(&updated)?;

        if updated == previous {
            debug!("event=task_update module=planner status=unchanged task_id={id}");
            return Ok(updated);
        }

        self.tasks.replace(updated.clone());
        self.undo.push(Command::Update {
            task_id: id.to_string(),
            previous,
        });
        info!(
            "event=task_update module=planner status=ok task_id={} start={} end={}",
            id, updated.start_date, updated.end_date
        );
        Ok(updated)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, PlannerError> {
        if self.gesture.active_task_id() == Some(id) {
            self.gesture.teardown();
        }
        let removed = self
            .tasks
            .remove(id)
            .ok_or_else(|| PlannerError::NotFound(id.to_string()))?;
        self.undo.push(Command::Delete {
            snapshot: removed.clone(),
        });
        info!("event=task_delete module=planner status=ok task_id={id}");
        Ok(removed)
    }

    /// Reverts the most recent mutation. False when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let kind = self.undo.peek().map(Command::kind);
        let target = self.undo.peek().map(|command| command.task_id().to_string());
        if target.is_some() && self.gesture.active_task_id() == target.as_deref() {
            self.gesture.teardown();
        }
        let undone = self.undo.undo(&mut self.tasks);
        info!(
            "event=undo module=planner status={} kind={}",
            if undone { "ok" } else { "empty" },
            kind.unwrap_or("none")
        );
        undone
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn layout(&self, reference: NaiveDate) -> MonthLayout {
        match &self.assignee_filter {
            None => layout::layout(self.tasks.as_slice(), reference),
            Some(_) => layout::layout(&self.visible_tasks(), reference),
        }
    }

    /// Moves or resizes by whole days, clamping exactly as a pointer gesture would.
    pub fn shift_task(
        &mut self,
        id: &str,
        mode: GestureMode,
        days: i64,
    ) -> Result<Task, PlannerError> {
        let task = self.require(id)?;
        let (start, end) = shifted_range(mode, task.start_date, task.end_date, days)
            .ok_or_else(|| {
                TaskValidationError::new(format!(
                    "shifting task {id} by {days} days leaves the supported date range"
                ))
            })?;
        self.update_task(id, &TaskPatch::dates(start, end))
    }

    // Sidebar edits. Each is a single update and a single undo entry.

    /// Moves the start; the end follows when the new start passes it.
    pub fn set_start_date(&mut self, id: &str, start: NaiveDate) -> Result<Task, PlannerError> {
        let task = self.require(id)?;
        let end = task.end_date.max(start);
        self.update_task(id, &TaskPatch::dates(start, end))
    }

    /// Moves the end; the start follows when the new end precedes it.
    pub fn set_end_date(&mut self, id: &str, end: NaiveDate) -> Result<Task, PlannerError> {
        let task = self.require(id)?;
        let start = task.start_date.min(end);
        self.update_task(id, &TaskPatch::dates(start, end))
    }

    /// Keeps the start and sets an inclusive duration of `days`.
    pub fn set_duration(&mut self, id: &str, days: i64) -> Result<Task, PlannerError> {
        if days < 1 {
            return Err(TaskValidationError::new(format!(
                "duration must be at least 1 day, got {days}"
            ))
            .into());
        }
        let task = self.require(id)?;
        let end = Duration::try_days(days - 1)
            .and_then(|offset| task.start_date.checked_add_signed(offset))
            .ok_or_else(|| {
                TaskValidationError::new(format!(
                    "a duration of {days} days leaves the supported date range"
                ))
            })?;
        self.update_task(
            id,
            &TaskPatch {
                end_date: Some(end),
                ..TaskPatch::default()
            },
        )
    }

    /// Visible tasks ordered by start date, then by longer duration.
    pub fn task_list(&self) -> Vec<TaskListEntry> {
        let mut tasks = self.visible_tasks();
        tasks.sort_by(|a, b| layout::stacking_order(a, b));
        tasks.iter().map(TaskListEntry::from).collect()
    }

    /// Distinct assignees, alphabetically.
    pub fn assignees(&self) -> Vec<String> {
        self.tasks
            .iter()
            .map(|task| task.assignee.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn assignee_filter(&self) -> Option<&str> {
        self.assignee_filter.as_deref()
    }

    /// Restricts layout and the task list to one assignee. `None` shows everyone.
    pub fn set_assignee_filter(&mut self, assignee: Option<String>) {
        self.assignee_filter = assignee.filter(|a| !a.trim().is_empty());
        debug!(
            "event=assignee_filter module=planner status=ok assignee={}",
            self.assignee_filter.as_deref().unwrap_or("all")
        );
    }

    pub fn visible_tasks(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| match &self.assignee_filter {
                Some(assignee) => &task.assignee == assignee,
                None => true,
            })
            .cloned()
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        match &self.assignee_filter {
            Some(assignee) => self.tasks.iter().filter(|t| &t.assignee == assignee).count(),
            None => self.tasks.len(),
        }
    }

    pub fn gesture(&self) -> &DragTranslator<C> {
        &self.gesture
    }

    /// Starts a gesture on the task with `task_id`. False when the task is unknown or a
    /// gesture is already running.
    pub fn begin_gesture(
        &mut self,
        task_id: &str,
        mode: GestureMode,
        anchor: PointerPosition,
        geometry: CellGeometry,
    ) -> bool {
        let Some(task) = self.tasks.get(task_id) else {
            debug!("event=gesture_begin module=planner status=not_found task_id={task_id}");
            return false;
        };
        self.gesture.begin(task, mode, anchor, geometry)
    }

    pub fn update_gesture(&self, pointer: PointerPosition) -> Option<GesturePreview> {
        self.gesture.update(pointer)
    }

    /// Releases the pointer. A non-zero delta is committed as one `update_task`.
    pub fn end_gesture(
        &mut self,
        pointer: PointerPosition,
    ) -> Result<Option<GestureOutcome>, PlannerError> {
        let Some(outcome) = self.gesture.end(pointer) else {
            return Ok(None);
        };
        match &outcome {
            GestureOutcome::Discarded { task_id } => {
                debug!("event=gesture_end module=planner status=discarded task_id={task_id}");
            }
            GestureOutcome::Commit(preview) => {
                self.update_task(
                    &preview.task_id,
                    &TaskPatch::dates(preview.start_date, preview.end_date),
                )?;
            }
        }
        Ok(Some(outcome))
    }

    pub fn teardown_gesture(&mut self) {
        self.gesture.teardown();
    }

    fn require(&self, id: &str) -> Result<&Task, PlannerError> {
        self.tasks
            .get(id)
            .ok_or_else(|| PlannerError::NotFound(id.to_string()))
    }
}
