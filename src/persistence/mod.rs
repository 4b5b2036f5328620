use crate::item_validation::{self, ValidationError};
use crate::planner::AcademicPlanner;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid item: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("no planner stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Whole-planner storage: a save replaces everything previously stored.
pub trait PlannerStore {
    fn save_planner(&self, planner: &AcademicPlanner) -> PersistenceResult<()>;
    fn load_planner(&self) -> PersistenceResult<Option<AcademicPlanner>>;
}

pub fn validate_planner(planner: &AcademicPlanner) -> PersistenceResult<()> {
    item_validation::validate_items(planner.items())?;
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    ImportReport, ImportRowError, JsonFileStore, export_deadlines_to_csv, import_items,
    import_items_from_csv, load_planner_from_json, planner_from_json_str, planner_to_json_string,
    save_planner_to_json, write_deadlines,
};
