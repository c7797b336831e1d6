use super::column_span::{ColumnSpan, column_span};
use crate::calendar::Week;
use crate::task::Task;
use std::cmp::Ordering;

/// A task together with its column footprint in the week being packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedTask<'a> {
    pub task: &'a Task,
    pub span: ColumnSpan,
}

/// Stacking order: earlier start first, then longer duration first. Tasks that tie on
/// both fall back to id order, so the result depends only on the set of tasks.
pub fn stacking_order(a: &Task, b: &Task) -> Ordering {
    a.start_date
        .cmp(&b.start_date)
        .then_with(|| b.duration_days().cmp(&a.duration_days()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Greedy first-fit interval partitioning of one week's tasks into stacked rows.
///
/// Within a returned row no two column ranges intersect. Tasks without a position in
/// `week` are skipped.
pub fn assign_rows<'a>(tasks: &[&'a Task], week: &Week) -> Vec<Vec<SpannedTask<'a>>> {
    let mut ordered: Vec<&'a Task> = tasks.to_vec();
    ordered.sort_by(|a, b| stacking_order(a, b));

    let mut rows: Vec<Vec<SpannedTask<'a>>> = Vec::new();
    for task in ordered {
        let Some(span) = column_span(task, week) else {
            continue;
        };

        let fits = rows
            .iter()
            .position(|row| row.iter().all(|placed| !placed.span.intersects(&span)));

        let entry = SpannedTask { task, span };
        match fits {
            Some(idx) => rows[idx].push(entry),
            None => rows.push(vec![entry]),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn ids(rows: &[Vec<SpannedTask<'_>>]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|s| s.task.id.clone()).collect())
            .collect()
    }

    #[test]
    fn longer_task_first_among_same_start() {
        let week = Week::containing(d(15)); // Jul 14 .. Jul 20
        let short = Task::new("short", "Internal Review", d(15), d(16));
        let long = Task::new("long", "Eye Candy", d(15), d(20));
        let rows = assign_rows(&[&short, &long], &week);
        assert_eq!(ids(&rows), vec![vec!["long"], vec!["short"]]);
    }

    #[test]
    fn disjoint_tasks_share_a_row() {
        let week = Week::containing(d(15));
        let a = Task::new("a", "A", d(14), d(15));
        let b = Task::new("b", "B", d(16), d(17));
        let c = Task::new("c", "C", d(15), d(16));
        let rows = assign_rows(&[&c, &b, &a], &week);
        assert_eq!(ids(&rows), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn later_task_backfills_an_upper_row() {
        let week = Week::containing(d(15));
        let first = Task::new("first", "First", d(14), d(15));
        let overlap = Task::new("overlap", "Overlap", d(15), d(18));
        let tail = Task::new("tail", "Tail", d(19), d(20));
        let rows = assign_rows(&[&tail, &overlap, &first], &week);
        assert_eq!(ids(&rows), vec![vec!["first", "tail"], vec!["overlap"]]);
    }

    #[test]
    fn exact_ties_fall_back_to_id() {
        let week = Week::containing(d(15));
        let b = Task::new("b", "Same", d(15), d(16));
        let a = Task::new("a", "Same", d(15), d(16));
        let rows = assign_rows(&[&b, &a], &week);
        assert_eq!(ids(&rows), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn empty_week_has_no_rows() {
        let week = Week::containing(d(15));
        assert!(assign_rows(&[], &week).is_empty());
    }
}
