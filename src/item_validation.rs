use crate::item::{AcademicItem, ItemCore, Plannable};
use chrono::NaiveDate;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("title must be a non-empty string")]
    EmptyTitle,
    #[error("invalid date '{input}' (expected YYYY-MM-DD)")]
    InvalidDate { input: String },
    #[error("weight must be a non-negative number (got {0})")]
    InvalidWeight(f64),
    #[error("estimated_hours must be a non-negative number (got {0})")]
    InvalidHours(f64),
    #[error("{field} must be at least 1 (got {value})")]
    NonPositive { field: &'static str, value: i64 },
    #[error("{field} must be a non-negative integer (got {value})")]
    Negative { field: &'static str, value: i64 },
    #[error("{field} must not be empty")]
    EmptyText { field: &'static str },
    #[error("score must be between 0 and 100 (got {0})")]
    InvalidScore(f64),
    #[error("unknown item type '{0}' (expected Assignment, Project or Exam)")]
    UnknownItemType(String),
    #[error("unknown exam type '{0}' (expected quiz, midterm, final or exam)")]
    UnknownExamType(String),
    #[error("unknown priority '{0}' (expected critical, high, medium or low)")]
    UnknownPriority(String),
    #[error("unknown status '{0}' (expected not_started, in_progress or completed)")]
    UnknownStatus(String),
    #[error("invalid number '{input}' for {field}")]
    InvalidNumber { field: &'static str, input: String },
}

/// Parses a `YYYY-MM-DD` calendar date, the only date format accepted at the
/// crate's boundaries (import rows, CLI input, reference dates).
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidDate {
            input: input.to_string(),
        }
    })
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

pub fn validate_weight(weight: f64) -> Result<(), ValidationError> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(ValidationError::InvalidWeight(weight));
    }
    Ok(())
}

pub fn validate_hours(hours: f64) -> Result<(), ValidationError> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(ValidationError::InvalidHours(hours));
    }
    Ok(())
}

pub fn validate_positive(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    if value < 1 {
        return Err(ValidationError::NonPositive { field, value });
    }
    u32::try_from(value).map_err(|_| ValidationError::InvalidNumber {
        field,
        input: value.to_string(),
    })
}

pub fn validate_non_negative(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative { field, value });
    }
    u32::try_from(value).map_err(|_| ValidationError::InvalidNumber {
        field,
        input: value.to_string(),
    })
}

pub fn validate_text(field: &'static str, text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText { field });
    }
    Ok(())
}

pub fn validate_score(score: f64) -> Result<(), ValidationError> {
    if !score.is_finite() || !(0.0..=MAX_SCORE).contains(&score) {
        return Err(ValidationError::InvalidScore(score));
    }
    Ok(())
}

pub fn validate_core(core: &ItemCore) -> Result<(), ValidationError> {
    validate_title(&core.title)?;
    validate_weight(core.weight)?;
    if let Some(score) = core.score {
        validate_score(score)?;
    }
    Ok(())
}

/// Re-checks an item that did not come through a constructor, e.g. one decoded
/// from a snapshot or a database row.
pub fn validate_item(item: &AcademicItem) -> Result<(), ValidationError> {
    validate_core(item.core())?;
    match item {
        AcademicItem::Assignment(assignment) => {
            validate_hours(assignment.estimated_hours)?;
            for note in &assignment.notes {
                validate_text("note", note)?;
            }
        }
        AcademicItem::Project(project) => {
            validate_positive("num_milestones", i64::from(project.num_milestones))?;
            validate_positive("team_size", i64::from(project.team_size))?;
            for milestone in &project.milestones {
                validate_text("milestone name", &milestone.name)?;
            }
        }
        AcademicItem::Exam(_) => {}
    }
    Ok(())
}

pub fn validate_items(items: &[AcademicItem]) -> Result<(), ValidationError> {
    items.iter().try_for_each(validate_item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert_eq!(
            parse_date(" 2025-11-25 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 25).unwrap()
        );
        assert!(matches!(
            parse_date("2025-02-30"),
            Err(ValidationError::InvalidDate { .. })
        ));
        assert!(parse_date("11/25/2025").is_err());
    }

    #[test]
    fn weight_rejects_negative_and_non_finite() {
        assert!(validate_weight(0.0).is_ok());
        assert!(validate_weight(250.0).is_ok());
        assert_eq!(
            validate_weight(-1.0),
            Err(ValidationError::InvalidWeight(-1.0))
        );
        assert!(validate_weight(f64::NAN).is_err());
    }

    #[test]
    fn positive_counts_reject_zero() {
        assert_eq!(validate_positive("team_size", 3), Ok(3));
        assert_eq!(
            validate_positive("team_size", 0),
            Err(ValidationError::NonPositive {
                field: "team_size",
                value: 0
            })
        );
        assert!(validate_non_negative("num_chapters", 0).is_ok());
        assert!(validate_non_negative("num_chapters", -2).is_err());
    }

    #[test]
    fn decoded_items_are_checked_through_their_core() {
        let good: AcademicItem = serde_json::from_str(
            r#"{"type": "Project", "title": "P", "due_date": "2025-02-01",
                "course_code": "C", "weight": 10.0, "num_milestones": 2, "team_size": 2}"#,
        )
        .unwrap();
        assert_eq!(validate_item(&good), Ok(()));

        let mut no_team = serde_json::to_value(&good).unwrap();
        no_team["team_size"] = serde_json::json!(0);
        let no_team: AcademicItem = serde_json::from_value(no_team).unwrap();
        assert_eq!(
            validate_item(&no_team),
            Err(ValidationError::NonPositive {
                field: "team_size",
                value: 0
            })
        );

        let mut blank_title = serde_json::to_value(&good).unwrap();
        blank_title["title"] = serde_json::json!("  ");
        let blank_title: AcademicItem = serde_json::from_value(blank_title).unwrap();
        assert_eq!(validate_item(&blank_title), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(validate_score(0.0).is_ok());
        assert!(validate_score(100.0).is_ok());
        assert!(validate_score(100.5).is_err());
    }
}
