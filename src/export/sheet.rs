//! Spreadsheet sync layout.
//!
//! The spreadsheet collaborator receives a [`SyncPayload`] and draws one calendar per
//! month that has tasks. The cell geometry it draws is computed here from the same
//! month layout the grid uses, clipped to the month's own days.

use super::ExportError;
use super::color::contrast_text_color;
use crate::calendar::{DAYS_PER_WEEK, WEEKDAY_LABELS, first_of_month, last_of_month, month_label};
use crate::layout::layout;
use crate::project::ProjectInfo;
use crate::task::{DEFAULT_ASSIGNEE, Task};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Number of sheet rows between two stacked month calendars on the main tab.
pub const MONTH_SPACING_ROWS: usize = 2;

/// A calendar month, `month` in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Tab name such as `Jul 2024`.
    pub fn tab_name(&self) -> String {
        month_label(self.year, self.month)
    }

    fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

/// Every month touched by at least one task, chronologically.
pub fn months_with_tasks(tasks: &[Task]) -> Vec<MonthKey> {
    let mut months = BTreeSet::new();
    for task in tasks {
        let last = MonthKey::of(task.end_date);
        let mut current = MonthKey::of(task.start_date);
        while current <= last {
            months.insert(current);
            current = current.next();
        }
    }
    months.into_iter().collect()
}

/// Tasks whose end date falls in `month`.
pub fn tasks_due_in_month(tasks: &[Task], month: MonthKey) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| MonthKey::of(task.end_date) == month)
        .collect()
}

/// `Jul 2` style date used in list cells.
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// A task bar on the sheet. Rows and columns are 1-based; `span > 1` cells are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTaskCell {
    pub task_id: String,
    pub row: usize,
    pub column: usize,
    pub span: usize,
    pub name: String,
    pub background: String,
    pub font_color: &'static str,
}

impl SheetTaskCell {
    pub fn is_merged(&self) -> bool {
        self.span > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetWeek {
    pub date_row: usize,
    pub task_start_row: usize,
    pub task_rows: usize,
    /// `(column, day of month)` for each in-month date of the week.
    pub dates: Vec<(usize, u32)>,
    pub tasks: Vec<SheetTaskCell>,
}

impl SheetWeek {
    pub fn spacer_row(&self) -> usize {
        self.task_start_row + self.task_rows
    }
}

/// One month calendar block as drawn on a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetCalendar {
    pub month: MonthKey,
    pub title: String,
    pub title_row: usize,
    pub header_row: usize,
    pub weeks: Vec<SheetWeek>,
}

impl SheetCalendar {
    /// Last sheet row used by the block (the final week's spacer row).
    pub fn last_row(&self) -> usize {
        self.weeks
            .last()
            .map(SheetWeek::spacer_row)
            .unwrap_or(self.header_row)
    }

    pub fn task_cells(&self) -> impl Iterator<Item = &SheetTaskCell> {
        self.weeks.iter().flat_map(|week| week.tasks.iter())
    }
}

/// Lays out `month` starting at sheet row `start_row`: title, weekday header, then per week
/// a date row, `max(1, n)` task rows and a spacer row.
pub fn build_sheet_calendar(
    tasks: &[Task],
    project_name: &str,
    month: MonthKey,
    start_row: usize,
) -> Result<SheetCalendar, ExportError> {
    let first_day = month.first_day().ok_or(ExportError::InvalidMonth {
        year: month.year,
        month: month.month,
    })?;
    let month_start = first_of_month(first_day);
    let month_end = last_of_month(first_day);
    let month_layout = layout(tasks, first_day);

    let title_row = start_row;
    let header_row = start_row + 1;
    let mut next_row = start_row + 2;
    let mut weeks = Vec::with_capacity(month_layout.weeks.len());

    for week_layout in &month_layout.weeks {
        let in_month: Vec<(usize, NaiveDate)> = week_layout
            .week
            .days()
            .iter()
            .enumerate()
            .filter(|(_, date)| month_start <= **date && **date <= month_end)
            .map(|(col, date)| (col, *date))
            .collect();
        let (Some(&(first_col, _)), Some(&(last_col, _))) = (in_month.first(), in_month.last())
        else {
            continue;
        };

        let date_row = next_row;
        let task_start_row = date_row + 1;

        let mut cells = Vec::new();
        let mut row_offset = 0;
        for row in &week_layout.rows {
            let mut placed_any = false;
            for placement in row {
                let start = placement.position.start_column.max(first_col);
                let end = (placement.position.start_column + placement.position.span - 1)
                    .min(last_col);
                if start > end {
                    continue;
                }
                placed_any = true;
                cells.push(SheetTaskCell {
                    task_id: placement.task.id.clone(),
                    row: task_start_row + row_offset,
                    column: start + 1,
                    span: end - start + 1,
                    name: placement.task.name.clone(),
                    background: placement.task.color.clone(),
                    font_color: contrast_text_color(&placement.task.color),
                });
            }
            if placed_any {
                row_offset += 1;
            }
        }

        let task_rows = row_offset.max(1);
        weeks.push(SheetWeek {
            date_row,
            task_start_row,
            task_rows,
            dates: in_month
                .iter()
                .map(|(col, date)| (col + 1, date.day()))
                .collect(),
            tasks: cells,
        });
        next_row = date_row + 1 + task_rows + 1;
    }

    Ok(SheetCalendar {
        month,
        title: format!("{} - {}", project_name, first_day.format("%B %Y")),
        title_row,
        header_row,
        weeks,
    })
}

/// Every month with tasks stacked on one sheet, separated by blank rows.
pub fn build_main_calendars(
    tasks: &[Task],
    project_name: &str,
) -> Result<Vec<SheetCalendar>, ExportError> {
    let mut row = 1;
    let mut calendars = Vec::new();
    for month in months_with_tasks(tasks) {
        let calendar = build_sheet_calendar(tasks, project_name, month, row)?;
        row = calendar.last_row() + MONTH_SPACING_ROWS;
        calendars.push(calendar);
    }
    Ok(calendars)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListRow {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    pub assignee: String,
    pub background: String,
    pub font_color: &'static str,
}

/// The `Task / Start / End / Days / Assignee` list, by start date.
pub fn task_list_rows(tasks: &[Task]) -> Vec<TaskListRow> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|task| task.start_date);
    sorted
        .into_iter()
        .map(|task| TaskListRow {
            name: task.name.clone(),
            start_date: task.start_date,
            end_date: task.end_date,
            days: task.duration_days(),
            assignee: task.assignee.clone(),
            background: task.color.clone(),
            font_color: contrast_text_color(&task.color),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueDate {
    pub name: String,
    pub due: NaiveDate,
    pub background: String,
    pub font_color: &'static str,
}

impl DueDate {
    pub fn label(&self) -> String {
        format_short_date(self.due)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeDueDates {
    pub assignee: String,
    pub tasks: Vec<DueDate>,
}

/// Groups tasks by assignee (alphabetical), each group ordered by end date.
pub fn due_dates_by_assignee<'a, I>(tasks: I) -> Vec<AssigneeDueDates>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut groups: BTreeMap<String, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        let assignee = if task.assignee.trim().is_empty() {
            DEFAULT_ASSIGNEE.to_string()
        } else {
            task.assignee.clone()
        };
        groups.entry(assignee).or_default().push(task);
    }

    groups
        .into_iter()
        .map(|(assignee, mut tasks)| {
            tasks.sort_by_key(|task| task.end_date);
            AssigneeDueDates {
                assignee,
                tasks: tasks
                    .into_iter()
                    .map(|task| DueDate {
                        name: task.name.clone(),
                        due: task.end_date,
                        background: task.color.clone(),
                        font_color: contrast_text_color(&task.color),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Body posted to the spreadsheet sync endpoint. `month` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub tasks: Vec<Task>,
    pub month: u32,
    pub year: i32,
    pub project_name: String,
}

impl SyncPayload {
    pub fn new(project: &ProjectInfo, tasks: &[Task], reference: NaiveDate) -> Self {
        Self {
            tasks: tasks.to_vec(),
            month: reference.month0(),
            year: reference.year(),
            project_name: project.name.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The calendar block as a `row` column plus one text column per weekday. Merged cells
/// carry their text in the leftmost column only.
pub fn calendar_frame(calendar: &SheetCalendar) -> Result<DataFrame, ExportError> {
    let first_row = calendar.title_row;
    let height = calendar.last_row() - first_row + 1;
    let mut grid: Vec<Vec<Option<String>>> = vec![vec![None; height]; DAYS_PER_WEEK];

    grid[0][0] = Some(calendar.title.clone());
    for (col, label) in WEEKDAY_LABELS.iter().enumerate() {
        grid[col][calendar.header_row - first_row] = Some((*label).to_string());
    }
    for week in &calendar.weeks {
        for &(column, day) in &week.dates {
            grid[column - 1][week.date_row - first_row] = Some(day.to_string());
        }
        for cell in &week.tasks {
            grid[cell.column - 1][cell.row - first_row] = Some(cell.name.clone());
        }
    }

    let rows: Vec<u32> = (first_row..first_row + height).map(|r| r as u32).collect();
    let mut columns = vec![Column::new("row".into(), rows)];
    for (label, values) in WEEKDAY_LABELS.iter().zip(grid) {
        columns.push(Column::new((*label).into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

/// The task list as a frame with `Date` typed start/end columns.
pub fn task_list_frame(tasks: &[Task]) -> Result<DataFrame, ExportError> {
    let rows = task_list_rows(tasks);
    let names: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
    let starts: Vec<i32> = rows.iter().map(|r| date_to_i32(r.start_date)).collect();
    let ends: Vec<i32> = rows.iter().map(|r| date_to_i32(r.end_date)).collect();
    let days: Vec<i64> = rows.iter().map(|r| r.days).collect();
    let assignees: Vec<String> = rows.iter().map(|r| r.assignee.clone()).collect();

    let frame = df!(
        "Task" => names,
        "Start" => starts,
        "End" => ends,
        "Days" => days,
        "Assignee" => assignees
    )?;

    let frame = frame
        .lazy()
        .with_columns([
            col("Start").cast(DataType::Date),
            col("End").cast(DataType::Date),
        ])
        .collect()?;
    Ok(frame)
}

fn date_to_i32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

// 1970-01-01 counted from 0001-01-01 (day 1).
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
