use crate::task::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub color: String,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            name: "Marketing Campaign".to_string(),
            color: "#e07a5f".to_string(),
        }
    }
}

/// Everything a store persists for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub project: ProjectInfo,
    pub tasks: Vec<Task>,
}

impl ProjectSnapshot {
    pub fn new(project: ProjectInfo, tasks: Vec<Task>) -> Self {
        Self { project, tasks }
    }
}

/// The July 2024 campaign used to seed a fresh calendar.
pub fn sample_snapshot() -> ProjectSnapshot {
    let rows: [(&str, &str, &str, (u32, u32), &str); 13] = [
        ("task-1", "Creative Cut - Refreshed", "Sarah Chen", (2, 4), "#e07a5f"),
        ("task-2", "Creative Cut - Refreshed", "Marcus Webb", (5, 5), "#e07a5f"),
        ("task-3", "Creative Cut - Refreshed", "Sarah Chen", (8, 9), "#f4d19b"),
        ("task-4", "Live Creative Review/Edit Session Refreshed", "Team", (9, 10), "#81a684"),
        ("task-5", "Internal Cut - Refreshed", "Elena Rodriguez", (10, 13), "#f4d19b"),
        ("task-6", "Creative Cut - Eye Candy", "Team", (15, 20), "#d4a574"),
        ("task-7", "Internal Review Refreshed", "Marcus Webb", (15, 16), "#7d9bb8"),
        ("task-8", "Synthesize Notes Refreshed", "Sarah Chen", (16, 17), "#c9b8d4"),
        ("task-9", "Rough Cut - Refreshed", "Elena Rodriguez", (17, 21), "#f4d19b"),
        ("task-10", "Live Rough Review Refreshed", "Team", (22, 24), "#81a684"),
        ("task-11", "Rough Cut Synthesize Notes Refreshed", "Sarah Chen", (24, 25), "#f4d19b"),
        ("task-12", "Fine Cut - Refreshed", "Marcus Webb", (26, 27), "#e07a5f"),
        ("task-13", "Record & Select VO Refreshed", "Elena Rodriguez", (26, 27), "#f7e96c"),
    ];

    let tasks = rows
        .iter()
        .filter_map(|&(id, name, assignee, (start, end), color)| {
            let start = NaiveDate::from_ymd_opt(2024, 7, start)?;
            let end = NaiveDate::from_ymd_opt(2024, 7, end)?;
            Some(
                Task::new(id, name, start, end)
                    .with_assignee(assignee)
                    .with_color(color),
            )
        })
        .collect();

    ProjectSnapshot::new(ProjectInfo::default(), tasks)
}
