use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::workload::MAX_WEEKS_AHEAD;

pub const CONFIG_PATH_ENV: &str = "ACADEMIC_PLANNER_CONFIG";
pub const OWNER_ENV: &str = "ACADEMIC_PLANNER_OWNER";
pub const DATA_PATH_ENV: &str = "ACADEMIC_PLANNER_DATA";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Session settings for the planner shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub owner_name: String,
    pub data_path: PathBuf,
    pub default_days_ahead: u32,
    pub default_weeks_ahead: u32,
    pub default_export_days: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            owner_name: "Student".to_string(),
            data_path: PathBuf::from("planner.json"),
            default_days_ahead: 7,
            default_weeks_ahead: 2,
            default_export_days: 30,
        }
    }
}

impl PlannerConfig {
    /// Reads a JSON config; fields left out keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: PlannerConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the file named by `ACADEMIC_PLANNER_CONFIG`, then the
    /// owner and data path environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Ok(owner) = env::var(OWNER_ENV) {
            config.owner_name = owner;
        }
        if let Some(path) = env::var_os(DATA_PATH_ENV) {
            config.data_path = PathBuf::from(path);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_path must not be empty".into()));
        }
        for (name, value) in [
            ("default_days_ahead", self.default_days_ahead),
            ("default_weeks_ahead", self.default_weeks_ahead),
            ("default_export_days", self.default_export_days),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
            }
        }
        if self.default_weeks_ahead > MAX_WEEKS_AHEAD {
            return Err(ConfigError::Invalid(format!(
                "default_weeks_ahead must be at most {MAX_WEEKS_AHEAD}"
            )));
        }
        Ok(())
    }
}
