use crate::calendar::Week;
use crate::task::Task;

/// Tasks overlapping `week` (closed interval), in their original relative order.
pub fn tasks_in_week<'a>(tasks: &'a [Task], week: &Week) -> Vec<&'a Task> {
    tasks_between(tasks, week.first(), week.last())
}

pub(crate) fn tasks_between(
    tasks: &[Task],
    first: chrono::NaiveDate,
    last: chrono::NaiveDate,
) -> Vec<&Task> {
    tasks.iter().filter(|task| task.overlaps(first, last)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn keeps_boundary_touching_tasks_in_order() {
        let week = Week::containing(d(7, 3)); // Jun 30 .. Jul 6
        let tasks = vec![
            Task::new("late", "Ends on Sunday", d(6, 25), d(6, 30)),
            Task::new("before", "Ends Saturday before", d(6, 20), d(6, 29)),
            Task::new("after", "Starts next Sunday", d(7, 7), d(7, 8)),
            Task::new("edge", "Starts on Saturday", d(7, 6), d(7, 9)),
        ];
        let ids: Vec<&str> = tasks_in_week(&tasks, &week)
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["late", "edge"]);
    }
}
