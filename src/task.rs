use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ASSIGNEE: &str = "Unassigned";
pub const DEFAULT_COLOR: &str = "#e07a5f";

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A named, colored, date-ranged task placed on the month calendar.
///
/// Dates are naive calendar dates and serialize as `YYYY-MM-DD`, which is also the
/// wire format handed to the spreadsheet and document collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default = "default_assignee")]
    pub assignee: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_color")]
    pub color: String,
}

/// Task data as supplied to `add_task`, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Partial update applied by `update_task`. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn default_assignee() -> String {
    DEFAULT_ASSIGNEE.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            assignee: default_assignee(),
            start_date,
            end_date,
            color: default_color(),
        }
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = assignee.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Inclusive length in days; a task starting and ending on the same day lasts 1 day.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn overlaps(&self, first: NaiveDate, last: NaiveDate) -> bool {
        self.start_date <= last && self.end_date >= first
    }

    pub(crate) fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = assignee.clone();
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
    }
}

impl NewTask {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            assignee: None,
            start_date,
            end_date,
            color: None,
        }
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builds the stored record. A missing or blank assignee becomes `Unassigned` here and
    /// nowhere else.
    pub fn into_task(self, id: impl Into<String>) -> Task {
        let assignee = self
            .assignee
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(default_assignee);
        Task {
            id: id.into(),
            name: self.name,
            assignee,
            start_date: self.start_date,
            end_date: self.end_date,
            color: self.color.unwrap_or_else(default_color),
        }
    }
}

impl TaskPatch {
    pub fn dates(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.assignee.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.color.is_none()
    }
}

/// Generates ids shaped like `task-1720000000000-k3j9x0a1b`.
pub fn generate_task_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("task-{millis}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn new_task_fills_default_assignee_once() {
        let task = NewTask::new("Review", d(2024, 7, 1), d(2024, 7, 2))
            .assignee("   ")
            .into_task("task-1");
        assert_eq!(task.assignee, DEFAULT_ASSIGNEE);
        assert_eq!(task.color, DEFAULT_COLOR);
    }

    #[test]
    fn duration_is_inclusive() {
        let task = Task::new("t", "Single", d(2024, 7, 3), d(2024, 7, 3));
        assert_eq!(task.duration_days(), 1);
        let task = Task::new("t", "Span", d(2024, 7, 30), d(2024, 8, 2));
        assert_eq!(task.duration_days(), 4);
    }

    #[test]
    fn serializes_dates_as_iso_strings() {
        let task = Task::new("task-1", "Cut", d(2024, 7, 2), d(2024, 7, 4));
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["startDate"], "2024-07-02");
        assert_eq!(json["endDate"], "2024-07-04");
        assert_eq!(json["assignee"], "Unassigned");
    }

    #[test]
    fn deserializing_without_assignee_uses_default() {
        let task: Task = serde_json::from_str(
            r##"{"id":"x","name":"n","startDate":"2024-07-01","endDate":"2024-07-01","color":"#fff"}"##,
        )
        .unwrap();
        assert_eq!(task.assignee, DEFAULT_ASSIGNEE);
    }

    #[test]
    fn generated_ids_have_expected_shape() {
        let id = generate_task_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "task");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), ID_SUFFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(generate_task_id(), id);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut task = Task::new("t", "Old", d(2024, 7, 1), d(2024, 7, 2)).with_assignee("Sam");
        task.apply_patch(&TaskPatch {
            name: Some("New".into()),
            ..TaskPatch::default()
        });
        assert_eq!(task.name, "New");
        assert_eq!(task.assignee, "Sam");
        assert_eq!(task.start_date, d(2024, 7, 1));
    }
}
