//! Renderer-facing export layouts: spreadsheet sync and printable document.

pub mod color;
pub mod document;
pub mod sheet;

pub use color::{brightness, contrast_text_color};
pub use document::{DocumentLayout, document_file_name, document_layout};
pub use sheet::{
    AssigneeDueDates, MonthKey, SheetCalendar, SyncPayload, TaskListRow, build_main_calendars,
    build_sheet_calendar, calendar_frame, due_dates_by_assignee, months_with_tasks,
    task_list_frame, task_list_rows, tasks_due_in_month,
};

use polars::prelude::PolarsError;
use std::fmt;

#[derive(Debug)]
pub enum ExportError {
    Table(PolarsError),
    Serialization(serde_json::Error),
    InvalidMonth { year: i32, month: u32 },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Table(err) => write!(f, "table error: {err}"),
            ExportError::Serialization(err) => write!(f, "serialization error: {err}"),
            ExportError::InvalidMonth { year, month } => {
                write!(f, "invalid month {year}-{month:02}")
            }
        }
    }
}

impl std::error::Error for ExportError {}

impl From<PolarsError> for ExportError {
    fn from(value: PolarsError) -> Self {
        Self::Table(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
