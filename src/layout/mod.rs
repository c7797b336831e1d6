//! Month layout pipeline.
//!
//! `layout()` is the only entry point renderers use: calendar window, per-week filter,
//! column spans, then row packing. It is a pure function of the task slice and the
//! reference date.

pub mod column_span;
pub mod rows;
pub mod week_filter;

pub use column_span::{ColumnSpan, column_span};
pub use rows::{SpannedTask, assign_rows, stacking_order};
pub use week_filter::tasks_in_week;

use crate::calendar::{CalendarWindow, Week};
use crate::task::Task;
use chrono::NaiveDate;
use serde::Serialize;

/// Where a task segment sits in the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub week_index: usize,
    pub start_column: usize,
    pub span: usize,
    pub row: usize,
}

/// One task segment inside one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub task: Task,
    pub position: Position,
    /// The task started in an earlier week; no left resize handle on this segment.
    pub continues_before: bool,
    /// The task ends in a later week; no right resize handle on this segment.
    pub continues_after: bool,
}

impl Placement {
    pub fn has_left_handle(&self) -> bool {
        !self.continues_before
    }

    pub fn has_right_handle(&self) -> bool {
        !self.continues_after
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekLayout {
    pub index: usize,
    pub week: Week,
    pub rows: Vec<Vec<Placement>>,
}

impl WeekLayout {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.rows.iter().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthLayout {
    pub reference: NaiveDate,
    pub window: CalendarWindow,
    pub weeks: Vec<WeekLayout>,
}

impl MonthLayout {
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.weeks.iter().flat_map(|week| week.placements())
    }

    /// All segments of one task, in week order.
    pub fn placements_for<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a Placement> {
        self.placements()
            .filter(move |placement| placement.task.id == task_id)
    }

    pub fn max_rows(&self) -> usize {
        self.weeks
            .iter()
            .map(WeekLayout::row_count)
            .max()
            .unwrap_or(0)
    }
}

/// Lays out `tasks` on the month containing `reference`.
pub fn layout(tasks: &[Task], reference: NaiveDate) -> MonthLayout {
    let window = CalendarWindow::for_date(reference);
    let weeks = window
        .weeks()
        .iter()
        .enumerate()
        .map(|(index, week)| layout_week(tasks, index, week))
        .collect();

    MonthLayout {
        reference,
        window,
        weeks,
    }
}

fn layout_week(tasks: &[Task], index: usize, week: &Week) -> WeekLayout {
    let overlapping = tasks_in_week(tasks, week);
    let rows = assign_rows(&overlapping, week)
        .into_iter()
        .enumerate()
        .map(|(row, entries)| {
            entries
                .into_iter()
                .map(|entry| Placement {
                    task: entry.task.clone(),
                    position: Position {
                        week_index: index,
                        start_column: entry.span.start_column,
                        span: entry.span.span,
                        row,
                    },
                    continues_before: entry.task.start_date < week.first(),
                    continues_after: entry.task.end_date > week.last(),
                })
                .collect()
        })
        .collect();

    WeekLayout {
        index,
        week: *week,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn multi_week_task_is_split_into_flagged_segments() {
        let task = Task::new("span", "Rough Cut", d(7, 17), d(7, 23));
        let month = layout(std::slice::from_ref(&task), d(7, 1));
        let segments: Vec<&Placement> = month.placements_for("span").collect();
        assert_eq!(segments.len(), 2);

        assert_eq!(segments[0].position.start_column, 3);
        assert_eq!(segments[0].position.span, 4);
        assert!(!segments[0].continues_before);
        assert!(segments[0].continues_after);

        assert_eq!(segments[1].position.start_column, 0);
        assert_eq!(segments[1].position.span, 3);
        assert!(segments[1].has_right_handle());
        assert!(!segments[1].has_left_handle());
    }

    #[test]
    fn empty_collection_still_yields_all_weeks() {
        let month = layout(&[], d(7, 4));
        assert_eq!(month.weeks.len(), 5);
        assert_eq!(month.max_rows(), 0);
    }
}
