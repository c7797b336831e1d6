use crate::task::Task;
use std::sync::Arc;

/// The active project's tasks.
///
/// Readers take cheap `snapshot()`s; every mutation goes through `Arc::make_mut`, so a
/// snapshot held by a renderer is never changed underneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Arc<Vec<Task>>,
}

impl TaskCollection {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(tasks),
        }
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn snapshot(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.tasks)
    }

    pub fn to_vec(&self) -> Vec<Task> {
        self.tasks.as_ref().clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Appends `task`. Returns false, leaving the collection untouched, if the id exists.
    pub fn insert(&mut self, task: Task) -> bool {
        if self.contains(&task.id) {
            return false;
        }
        Arc::make_mut(&mut self.tasks).push(task);
        true
    }

    /// Overwrites the task sharing `task.id` and returns the previous record.
    pub fn replace(&mut self, task: Task) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == task.id)?;
        let slot = &mut Arc::make_mut(&mut self.tasks)[idx];
        Some(std::mem::replace(slot, task))
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        Some(Arc::make_mut(&mut self.tasks).remove(idx))
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: &str) -> Task {
        let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        Task::new(id, id.to_uppercase(), day, day)
    }

    #[test]
    fn snapshots_are_not_affected_by_later_writes() {
        let mut tasks = TaskCollection::new(vec![task("a")]);
        let before = tasks.snapshot();
        tasks.insert(task("b"));
        tasks.remove("a");
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].id, "a");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks.as_slice()[0].id, "b");
    }

    #[test]
    fn insert_refuses_duplicate_ids() {
        let mut tasks = TaskCollection::new(vec![task("a")]);
        assert!(!tasks.insert(task("a")));
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn replace_returns_previous_record() {
        let mut tasks = TaskCollection::new(vec![task("a")]);
        let mut renamed = task("a");
        renamed.name = "Renamed".into();
        let previous = tasks.replace(renamed).unwrap();
        assert_eq!(previous.name, "A");
        assert_eq!(tasks.get("a").unwrap().name, "Renamed");
        assert!(tasks.replace(task("missing")).is_none());
    }
}
