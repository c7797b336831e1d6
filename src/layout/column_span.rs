use crate::calendar::{DAYS_PER_WEEK, Week};
use crate::task::Task;
use serde::Serialize;
use std::cmp::{max, min};

/// Horizontal footprint of a task inside one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpan {
    pub start_column: usize,
    pub span: usize,
}

impl ColumnSpan {
    /// Last occupied column, inclusive.
    pub fn end_column(&self) -> usize {
        self.start_column + self.span - 1
    }

    /// Closed-interval intersection on columns.
    pub fn intersects(&self, other: &ColumnSpan) -> bool {
        !(self.end_column() < other.start_column || self.start_column > other.end_column())
    }
}

/// Column placement of `task` within `week`, or `None` when they do not overlap.
///
/// Every renderer goes through this function; nothing else derives column math.
pub fn column_span(task: &Task, week: &Week) -> Option<ColumnSpan> {
    let effective_start = max(task.start_date, week.first());
    let effective_end = min(task.end_date, week.last());
    if effective_start > effective_end {
        return None;
    }

    let start_column = (effective_start - week.first()).num_days() as usize;
    let days = (effective_end - effective_start).num_days() as usize + 1;
    let span = min(days, DAYS_PER_WEEK - start_column);
    Some(ColumnSpan { start_column, span })
}
