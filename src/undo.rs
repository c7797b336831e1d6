use crate::collection::TaskCollection;
use crate::task::Task;
use log::debug;
use serde::Serialize;
use std::collections::VecDeque;

pub const UNDO_CAPACITY: usize = 50;

/// An undoable record of one task mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    Add { task_id: String },
    Update { task_id: String, previous: Task },
    Delete { snapshot: Task },
}

impl Command {
    pub fn task_id(&self) -> &str {
        match self {
            Command::Add { task_id } | Command::Update { task_id, .. } => task_id,
            Command::Delete { snapshot } => &snapshot.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
        }
    }

    /// Applies the inverse mutation to `tasks`. Returns false when there was nothing to
    /// invert against (the task is missing, or already present for a delete).
    pub fn invert(self, tasks: &mut TaskCollection) -> bool {
        match self {
            Command::Add { task_id } => tasks.remove(&task_id).is_some(),
            Command::Update { previous, .. } => tasks.replace(previous).is_some(),
            Command::Delete { snapshot } => tasks.insert(snapshot),
        }
    }
}

/// Bounded LIFO of commands. Oldest entries fall off silently past capacity.
#[derive(Debug, Clone)]
pub struct UndoLog {
    commands: VecDeque<Command>,
    capacity: usize,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::with_capacity(UNDO_CAPACITY)
    }
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            commands: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push_back(command);
        while self.commands.len() > self.capacity {
            if let Some(evicted) = self.commands.pop_front() {
                debug!(
                    "event=undo_evict module=undo status=ok kind={} task_id={}",
                    evicted.kind(),
                    evicted.task_id()
                );
            }
        }
    }

    /// Pops the newest command and applies its inverse. Nothing is pushed in return.
    pub fn undo(&mut self, tasks: &mut TaskCollection) -> bool {
        match self.commands.pop_back() {
            Some(command) => command.invert(tasks),
            None => false,
        }
    }

    pub fn peek(&self) -> Option<&Command> {
        self.commands.back()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}
