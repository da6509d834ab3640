#![forbid(unsafe_code)]

pub mod model;
mod percent;
pub mod progression;
pub mod time;

pub use progression::{
    Completion, CompletionPolicy, ModuleStatus, ProgressError, ProgressSummary, TimelineEntry,
    TrainingState, complete_module, completion_timeline, missing_prerequisites, module_status,
    progress_percentage, try_complete_module,
};
pub use time::Clock;
