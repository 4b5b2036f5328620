pub mod config;
pub mod frame;
pub mod item;
pub mod item_validation;
pub mod persistence;
pub mod planner;
pub mod priority;
pub mod utils;
pub mod workload;

pub use config::{ConfigError, PlannerConfig};
pub use frame::{FRAME_COLUMNS, planner_to_dataframe, render_text_table};
pub use item::{
    AcademicItem, Assignment, Exam, ExamType, ItemCore, ItemKind, ItemStatus, Milestone,
    Plannable, Project,
};
pub use item_validation::{ValidationError, parse_date};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlannerStore;
pub use persistence::{
    ImportReport, ImportRowError, JsonFileStore, PersistenceError, PersistenceResult,
    PlannerStore, export_deadlines_to_csv, import_items, import_items_from_csv,
    load_planner_from_json, save_planner_to_json, write_deadlines,
};
pub use planner::{AcademicPlanner, PlannerError};
pub use priority::Priority;
pub use utils::format_course_code;
pub use workload::{CompletionStats, MAX_WEEKS_AHEAD, PrioritySummary, WorkloadDistribution};
