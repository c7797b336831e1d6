pub mod calendar;
pub mod collection;
pub mod config;
pub mod export;
pub mod gesture;
pub mod layout;
pub mod persistence;
pub mod planner;
pub mod project;
pub mod task;
pub mod task_validation;
pub mod undo;

#[cfg(any(feature = "cli_api", feature = "http_api"))]
pub mod logging;

#[cfg(feature = "http_api")]
pub mod http_api;

pub use calendar::{CalendarWindow, DayCell, Week};
pub use collection::TaskCollection;
pub use config::{AppConfig, ConfigError, StoreConfig};
pub use export::ExportError;
pub use gesture::{
    CellGeometry, DragTranslator, GestureMode, GestureOutcome, GesturePreview, PointerCapture,
    PointerPosition,
};
pub use layout::{MonthLayout, Placement, Position, layout};
pub use persistence::{MemoryStore, PersistenceError, TaskStore};
pub use planner::{Planner, PlannerError, TaskListEntry};
pub use project::{ProjectInfo, ProjectSnapshot};
pub use task::{NewTask, Task, TaskPatch};
pub use task_validation::TaskValidationError;
pub use undo::{Command, UndoLog};
