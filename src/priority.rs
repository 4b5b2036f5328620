use crate::item_validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Assignment thresholds, in days, before weight scaling.
pub const ASSIGNMENT_CRITICAL_DAYS: f64 = 1.0;
pub const ASSIGNMENT_HIGH_DAYS: f64 = 3.0;
pub const ASSIGNMENT_MEDIUM_DAYS: f64 = 7.0;
/// Every `ASSIGNMENT_WEIGHT_STEP` points of weight add one more multiple of the
/// base thresholds.
pub const ASSIGNMENT_WEIGHT_STEP: f64 = 20.0;

pub const PROJECT_CRITICAL_DAYS: i64 = 5;
pub const PROJECT_HIGH_DAYS: i64 = 10;
pub const PROJECT_MEDIUM_DAYS: i64 = 21;
/// Projects at or above this many hours never drop below `Priority::Medium`.
pub const LARGE_PROJECT_HOURS: f64 = 15.0;

pub const EXAM_CRITICAL_DAYS: i64 = 7;
pub const EXAM_HIGH_DAYS: i64 = 14;
pub const EXAM_MEDIUM_DAYS: i64 = 21;

/// Priority band, ordered from most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError::UnknownPriority(other.to_string())),
        }
    }
}

pub fn assignment_priority(days_until_due: i64, weight: f64) -> Priority {
    if days_until_due < 0 {
        return Priority::Critical;
    }
    let scale = 1.0 + weight / ASSIGNMENT_WEIGHT_STEP;
    let days = days_until_due as f64;
    if days <= ASSIGNMENT_CRITICAL_DAYS * scale {
        Priority::Critical
    } else if days <= ASSIGNMENT_HIGH_DAYS * scale {
        Priority::High
    } else if days <= ASSIGNMENT_MEDIUM_DAYS * scale {
        Priority::Medium
    } else {
        Priority::Low
    }
}

pub fn project_priority(days_until_due: i64, time_commitment: f64) -> Priority {
    let band = if days_until_due < 0 || days_until_due <= PROJECT_CRITICAL_DAYS {
        Priority::Critical
    } else if days_until_due <= PROJECT_HIGH_DAYS {
        Priority::High
    } else if days_until_due <= PROJECT_MEDIUM_DAYS {
        Priority::Medium
    } else {
        Priority::Low
    };

    if band == Priority::Low && time_commitment >= LARGE_PROJECT_HOURS {
        Priority::Medium
    } else {
        band
    }
}

pub fn exam_priority(days_until_due: i64) -> Priority {
    if days_until_due < 0 || days_until_due <= EXAM_CRITICAL_DAYS {
        Priority::Critical
    } else if days_until_due <= EXAM_HIGH_DAYS {
        Priority::High
    } else if days_until_due <= EXAM_MEDIUM_DAYS {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdue_is_critical_for_every_rule() {
        assert_eq!(assignment_priority(-1, 0.0), Priority::Critical);
        assert_eq!(project_priority(-30, 0.0), Priority::Critical);
        assert_eq!(exam_priority(-2), Priority::Critical);
    }

    #[test]
    fn heavier_assignments_escalate_earlier() {
        // Weight 0 keeps the base thresholds: 1 / 3 / 7 days.
        assert_eq!(assignment_priority(1, 0.0), Priority::Critical);
        assert_eq!(assignment_priority(2, 0.0), Priority::High);
        assert_eq!(assignment_priority(5, 0.0), Priority::Medium);
        assert_eq!(assignment_priority(8, 0.0), Priority::Low);

        // Weight 40 triples them: 3 / 9 / 21 days.
        assert_eq!(assignment_priority(3, 40.0), Priority::Critical);
        assert_eq!(assignment_priority(8, 40.0), Priority::High);
        assert_eq!(assignment_priority(20, 40.0), Priority::Medium);
        assert_eq!(assignment_priority(22, 40.0), Priority::Low);
    }

    #[test]
    fn assignment_priority_never_drops_as_weight_grows() {
        for days in 0..40 {
            let mut previous = assignment_priority(days, 0.0);
            for weight in (0..=100).step_by(5) {
                let current = assignment_priority(days, weight as f64);
                assert!(current <= previous, "days={days} weight={weight}");
                previous = current;
            }
        }
    }

    #[test]
    fn project_bands_ignore_weight_and_bump_large_projects() {
        assert_eq!(project_priority(5, 2.0), Priority::Critical);
        assert_eq!(project_priority(6, 2.0), Priority::High);
        assert_eq!(project_priority(10, 2.0), Priority::High);
        assert_eq!(project_priority(21, 2.0), Priority::Medium);
        assert_eq!(project_priority(40, 2.0), Priority::Low);
        assert_eq!(project_priority(40, LARGE_PROJECT_HOURS), Priority::Medium);
    }

    #[test]
    fn exam_stays_at_least_medium_within_three_weeks() {
        assert_eq!(exam_priority(7), Priority::Critical);
        assert_eq!(exam_priority(14), Priority::High);
        for days in 15..=21 {
            assert_eq!(exam_priority(days), Priority::Medium);
        }
        assert_eq!(exam_priority(22), Priority::Low);
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::Critical.to_string(), "critical");
    }
}
