use super::{PersistenceError, PersistenceResult, PlannerStore};
use crate::item::{AcademicItem, Assignment, Exam, ExamType, ItemKind, Plannable, Project};
use crate::item_validation::{self, DATE_FORMAT, ValidationError};
use crate::planner::AcademicPlanner;
use crate::utils::format_course_code;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Serialize)]
struct PlannerSnapshotRef<'a> {
    owner_name: &'a str,
    items: &'a [AcademicItem],
}

#[derive(Deserialize)]
struct PlannerSnapshot {
    owner_name: String,
    #[serde(default)]
    items: Vec<AcademicItem>,
}

impl PlannerSnapshot {
    fn into_planner(self) -> PersistenceResult<AcademicPlanner> {
        item_validation::validate_items(&self.items)?;
        Ok(AcademicPlanner::with_items(self.owner_name, self.items))
    }
}

pub fn planner_to_json_string(planner: &AcademicPlanner) -> PersistenceResult<String> {
    super::validate_planner(planner)?;
    let snapshot = PlannerSnapshotRef {
        owner_name: planner.owner_name(),
        items: planner.items(),
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

pub fn planner_from_json_str(input: &str) -> PersistenceResult<AcademicPlanner> {
    let snapshot: PlannerSnapshot = serde_json::from_str(input)?;
    snapshot.into_planner()
}

/// Writes the snapshot to a temporary file next to `path` and renames it into
/// place, so the destination holds either the old or the new planner.
pub fn save_planner_to_json<P: AsRef<Path>>(
    planner: &AcademicPlanner,
    path: P,
) -> PersistenceResult<()> {
    let path = path.as_ref();
    super::validate_planner(planner)?;

    let dir = parent_dir(path);
    fs::create_dir_all(&dir)?;

    let snapshot = PlannerSnapshotRef {
        owner_name: planner.owner_name(),
        items: planner.items(),
    };
    let mut tmp = NamedTempFile::new_in(&dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;

    info!(path = %path.display(), items = planner.len(), "saved planner");
    Ok(())
}

pub fn load_planner_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<AcademicPlanner> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => PersistenceError::NotFound,
        _ => PersistenceError::Io(err),
    })?;
    let snapshot: PlannerSnapshot = serde_json::from_reader(io::BufReader::new(file))?;
    let planner = snapshot.into_planner()?;
    info!(path = %path.display(), items = planner.len(), "loaded planner");
    Ok(planner)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Planner snapshot kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlannerStore for JsonFileStore {
    fn save_planner(&self, planner: &AcademicPlanner) -> PersistenceResult<()> {
        save_planner_to_json(planner, &self.path)
    }

    fn load_planner(&self) -> PersistenceResult<Option<AcademicPlanner>> {
        match load_planner_from_json(&self.path) {
            Ok(planner) => Ok(Some(planner)),
            Err(PersistenceError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// One rejected import row. `row` counts data rows from 1, excluding the header.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: {message}")]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub items: Vec<AcademicItem>,
    pub errors: Vec<ImportRowError>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItemCsvRecord {
    #[serde(rename = "type")]
    item_type: String,
    title: String,
    due_date: String,
    course_code: String,
    weight: String,
    estimated_hours: String,
    num_milestones: String,
    team_size: String,
    exam_type: String,
    num_chapters: String,
}

impl ItemCsvRecord {
    fn into_item(self, default_course_code: Option<&str>) -> Result<AcademicItem, ValidationError> {
        let kind: ItemKind = self.item_type.parse()?;
        let due_date = item_validation::parse_date(&self.due_date)?;
        let course_code = if self.course_code.trim().is_empty() {
            format_course_code(default_course_code.unwrap_or_default())?
        } else {
            format_course_code(&self.course_code)?
        };
        let weight = parse_f64("weight", &self.weight)?.ok_or(ValidationError::EmptyText {
            field: "weight",
        })?;

        let item = match kind {
            ItemKind::Assignment => {
                let hours = parse_f64("estimated_hours", &self.estimated_hours)?.unwrap_or(0.0);
                Assignment::new(self.title, due_date, course_code, weight, hours)?.into()
            }
            ItemKind::Project => {
                let milestones = parse_count("num_milestones", &self.num_milestones)?;
                let team = parse_count("team_size", &self.team_size)?;
                Project::new(self.title, due_date, course_code, weight, milestones, team)?.into()
            }
            ItemKind::Exam => {
                let exam_type: ExamType = self.exam_type.parse()?;
                let chapters = parse_i64("num_chapters", &self.num_chapters)?.unwrap_or(0);
                Exam::new(
                    self.title,
                    due_date,
                    course_code,
                    weight,
                    exam_type,
                    item_validation::validate_non_negative("num_chapters", chapters)?,
                )?
                .into()
            }
        };
        Ok(item)
    }
}

/// Reads items from CSV with a header row. A bad row is recorded in the report
/// and the remaining rows are still imported.
pub fn import_items<R: Read>(
    input: R,
    default_course_code: Option<&str>,
) -> PersistenceResult<ImportReport> {
    let mut reader = csv::Reader::from_reader(input);
    let mut report = ImportReport::default();

    for (idx, record) in reader.deserialize::<ItemCsvRecord>().enumerate() {
        let row = idx + 1;
        let outcome = record
            .map_err(|err| err.to_string())
            .and_then(|record| {
                record
                    .into_item(default_course_code)
                    .map_err(|err| err.to_string())
            });
        match outcome {
            Ok(item) => report.items.push(item),
            Err(message) => {
                warn!(row, %message, "skipping import row");
                report.errors.push(ImportRowError { row, message });
            }
        }
    }

    Ok(report)
}

pub fn import_items_from_csv<P: AsRef<Path>>(
    path: P,
    default_course_code: Option<&str>,
) -> PersistenceResult<ImportReport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => PersistenceError::NotFound,
        _ => PersistenceError::Io(err),
    })?;
    let report = import_items(file, default_course_code)?;
    info!(
        path = %path.display(),
        imported = report.items.len(),
        rejected = report.errors.len(),
        "imported items"
    );
    Ok(report)
}

#[derive(Serialize)]
struct DeadlineCsvRecord<'a> {
    title: &'a str,
    due_date: String,
    course_code: &'a str,
    priority: &'static str,
    time_commitment: String,
}

/// Writes one CSV row per upcoming deadline and returns the number of rows.
pub fn write_deadlines<W: Write>(
    planner: &AcademicPlanner,
    output: W,
    days_ahead: u32,
    reference: NaiveDate,
) -> PersistenceResult<usize> {
    let mut writer = csv::Writer::from_writer(output);
    let deadlines = planner.upcoming_deadlines(days_ahead, reference);
    for item in &deadlines {
        writer.serialize(DeadlineCsvRecord {
            title: item.title(),
            due_date: item.due_date().format(DATE_FORMAT).to_string(),
            course_code: item.course_code(),
            priority: item.priority(reference).as_str(),
            time_commitment: format!("{:.2}", item.calculate_time_commitment()),
        })?;
    }
    if deadlines.is_empty() {
        writer.write_record([
            "title",
            "due_date",
            "course_code",
            "priority",
            "time_commitment",
        ])?;
    }
    writer.flush()?;
    Ok(deadlines.len())
}

pub fn export_deadlines_to_csv<P: AsRef<Path>>(
    planner: &AcademicPlanner,
    path: P,
    days_ahead: u32,
    reference: NaiveDate,
) -> PersistenceResult<usize> {
    let path = path.as_ref();
    fs::create_dir_all(parent_dir(path))?;
    let file = File::create(path)?;
    let rows = write_deadlines(planner, file, days_ahead, reference)?;
    info!(path = %path.display(), rows, "exported deadlines");
    Ok(rows)
}

fn parse_f64(field: &'static str, input: &str) -> Result<Option<f64>, ValidationError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            input: input.to_string(),
        })
}

/// Blank reads as 1. Zero is left for `Project::new` to reject.
fn parse_count(field: &'static str, input: &str) -> Result<u32, ValidationError> {
    let value = parse_i64(field, input)?.unwrap_or(1);
    u32::try_from(value).map_err(|_| {
        if value < 0 {
            ValidationError::NonPositive { field, value }
        } else {
            ValidationError::InvalidNumber {
                field,
                input: input.to_string(),
            }
        }
    })
}

fn parse_i64(field: &'static str, input: &str) -> Result<Option<i64>, ValidationError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_columns_use_defaults() {
        let csv = "type,title,due_date,course_code,weight\n\
                   Assignment,HW1,2025-11-25,inst326,10\n\
                   Project,Capstone,2025-12-10,inst490,40\n\
                   Exam,Quiz 1,2025-11-20,inst326,5\n";
        let report = import_items(csv.as_bytes(), None).unwrap();
        assert!(report.is_clean(), "{:?}", report.errors);
        assert_eq!(report.items.len(), 3);
        assert_eq!(report.items[0].course_code(), "INST326");
        assert_eq!(report.items[0].calculate_time_commitment(), 0.0);
        assert_eq!(report.items[1].calculate_time_commitment(), 4.0);
        assert_eq!(report.items[2].calculate_time_commitment(), 0.0);
    }

    #[test]
    fn blank_course_code_falls_back_to_default() {
        let csv = "type,title,due_date,course_code,weight\nAssignment,HW,2025-11-25,,10\n";
        let report = import_items(csv.as_bytes(), Some("cmsc131")).unwrap();
        assert_eq!(report.items[0].course_code(), "CMSC131");

        let report = import_items(csv.as_bytes(), None).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("course_code"));
    }

    #[test]
    fn unparsable_numbers_name_the_field() {
        let csv = "type,title,due_date,course_code,weight,team_size\n\
                   Project,P,2025-12-10,C,40,two\n";
        let report = import_items(csv.as_bytes(), None).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("team_size"));
    }

    #[test]
    fn zero_and_negative_project_counts_are_rejected_once() {
        let csv = "type,title,due_date,course_code,weight,num_milestones,team_size\n\
                   Project,Zero team,2025-12-10,C,40,2,0\n\
                   Project,Negative team,2025-12-10,C,40,2,-2\n\
                   Project,Zero milestones,2025-12-10,C,40,0,2\n\
                   Project,Huge team,2025-12-10,C,40,2,99999999999\n";
        let report = import_items(csv.as_bytes(), None).unwrap();
        assert!(report.items.is_empty());
        let messages: Vec<&str> = report.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "team_size must be at least 1 (got 0)",
                "team_size must be at least 1 (got -2)",
                "num_milestones must be at least 1 (got 0)",
                "invalid number '99999999999' for team_size",
            ]
        );
    }
}
