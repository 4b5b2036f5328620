use crate::item_validation::{self, ValidationError};
use crate::priority::{self, Priority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hours of work planned for each project milestone, before splitting across the team.
pub const HOURS_PER_MILESTONE: f64 = 4.0;
/// Study hours planned for each exam chapter.
pub const STUDY_HOURS_PER_CHAPTER: f64 = 3.0;
/// Flat extra study time for cumulative finals.
pub const FINAL_EXAM_BONUS_HOURS: f64 = 2.0;

/// Variant tag, used for filtering and on the wire. Behavior never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Assignment,
    Project,
    Exam,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::Assignment, ItemKind::Project, ItemKind::Exam];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Assignment => "Assignment",
            ItemKind::Project => "Project",
            ItemKind::Exam => "Exam",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assignment" => Ok(ItemKind::Assignment),
            "project" => Ok(ItemKind::Project),
            "exam" => Ok(ItemKind::Exam),
            _ => Err(ValidationError::UnknownItemType(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "not_started",
            ItemStatus::InProgress => "in_progress",
            ItemStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "not_started" => Ok(ItemStatus::NotStarted),
            "in_progress" => Ok(ItemStatus::InProgress),
            "completed" => Ok(ItemStatus::Completed),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    Quiz,
    Midterm,
    Final,
    #[default]
    #[serde(rename = "exam")]
    General,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Quiz => "quiz",
            ExamType::Midterm => "midterm",
            ExamType::Final => "final",
            ExamType::General => "exam",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ExamType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiz" => Ok(ExamType::Quiz),
            "midterm" => Ok(ExamType::Midterm),
            "final" => Ok(ExamType::Final),
            "exam" | "" => Ok(ExamType::General),
            other => Err(ValidationError::UnknownExamType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub date: NaiveDate,
}

/// Fields shared by every variant. Only reachable through a variant, so an
/// untyped item cannot exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCore {
    pub(crate) title: String,
    pub(crate) due_date: NaiveDate,
    pub(crate) course_code: String,
    pub(crate) weight: f64,
    #[serde(default)]
    pub(crate) status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) submission_date: Option<NaiveDate>,
}

impl ItemCore {
    fn new(
        title: impl Into<String>,
        due_date: NaiveDate,
        course_code: impl Into<String>,
        weight: f64,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        item_validation::validate_title(&title)?;
        item_validation::validate_weight(weight)?;
        Ok(Self {
            title: title.trim().to_string(),
            due_date,
            course_code: course_code.into(),
            weight,
            status: ItemStatus::NotStarted,
            score: None,
            submission_date: None,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn course_code(&self) -> &str {
        &self.course_code
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn submission_date(&self) -> Option<NaiveDate> {
        self.submission_date
    }

    pub fn is_completed(&self) -> bool {
        self.status == ItemStatus::Completed
    }

    /// Signed day count from `reference` to the due date; negative once overdue.
    pub fn days_until_due(&self, reference: NaiveDate) -> i64 {
        (self.due_date - reference).num_days()
    }

    /// Completed items are never overdue.
    pub fn is_overdue(&self, reference: NaiveDate) -> bool {
        !self.is_completed() && self.days_until_due(reference) < 0
    }

    fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }

    fn mark_completed(
        &mut self,
        score: f64,
        submission_date: Option<NaiveDate>,
    ) -> Result<(), ValidationError> {
        item_validation::validate_score(score)?;
        self.status = ItemStatus::Completed;
        self.score = Some(score);
        self.submission_date = submission_date;
        Ok(())
    }
}

/// The two polymorphic operations every academic item provides, plus its tag.
pub trait Plannable {
    fn core(&self) -> &ItemCore;

    fn item_type(&self) -> ItemKind;

    /// Estimated hours of work; never negative for a validated item.
    fn calculate_time_commitment(&self) -> f64;

    /// Priority band as of `reference`. Overdue items are always critical.
    fn priority(&self, reference: NaiveDate) -> Priority;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(flatten)]
    pub(crate) core: ItemCore,
    pub(crate) estimated_hours: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) instructions: Option<String>,
}

impl Assignment {
    pub fn new(
        title: impl Into<String>,
        due_date: NaiveDate,
        course_code: impl Into<String>,
        weight: f64,
        estimated_hours: f64,
    ) -> Result<Self, ValidationError> {
        let core = ItemCore::new(title, due_date, course_code, weight)?;
        item_validation::validate_hours(estimated_hours)?;
        Ok(Self {
            core,
            estimated_hours,
            notes: Vec::new(),
            instructions: None,
        })
    }

    pub fn estimated_hours(&self) -> f64 {
        self.estimated_hours
    }

    pub fn set_estimated_hours(&mut self, hours: f64) -> Result<(), ValidationError> {
        item_validation::validate_hours(hours)?;
        self.estimated_hours = hours;
        Ok(())
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn add_notes(&mut self, note: impl Into<String>) -> Result<(), ValidationError> {
        let note = note.into();
        item_validation::validate_text("note", &note)?;
        self.notes.push(note.trim().to_string());
        Ok(())
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn set_instructions(&mut self, text: impl Into<String>) -> Result<(), ValidationError> {
        let text = text.into();
        item_validation::validate_text("instructions", &text)?;
        self.instructions = Some(text.trim().to_string());
        Ok(())
    }
}

impl Plannable for Assignment {
    fn core(&self) -> &ItemCore {
        &self.core
    }

    fn item_type(&self) -> ItemKind {
        ItemKind::Assignment
    }

    fn calculate_time_commitment(&self) -> f64 {
        self.estimated_hours
    }

    fn priority(&self, reference: NaiveDate) -> Priority {
        priority::assignment_priority(self.core.days_until_due(reference), self.core.weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(flatten)]
    pub(crate) core: ItemCore,
    pub(crate) num_milestones: u32,
    pub(crate) team_size: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) milestones: Vec<Milestone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) repository: Option<String>,
}

impl Project {
    pub fn new(
        title: impl Into<String>,
        due_date: NaiveDate,
        course_code: impl Into<String>,
        weight: f64,
        num_milestones: u32,
        team_size: u32,
    ) -> Result<Self, ValidationError> {
        let core = ItemCore::new(title, due_date, course_code, weight)?;
        let num_milestones =
            item_validation::validate_positive("num_milestones", i64::from(num_milestones))?;
        let team_size = item_validation::validate_positive("team_size", i64::from(team_size))?;
        Ok(Self {
            core,
            num_milestones,
            team_size,
            milestones: Vec::new(),
            repository: None,
        })
    }

    pub fn num_milestones(&self) -> u32 {
        self.num_milestones
    }

    pub fn team_size(&self) -> u32 {
        self.team_size
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn add_milestone(
        &mut self,
        name: impl Into<String>,
        date: NaiveDate,
    ) -> Result<(), ValidationError> {
        let name = name.into();
        item_validation::validate_text("milestone name", &name)?;
        self.milestones.push(Milestone {
            name: name.trim().to_string(),
            date,
        });
        Ok(())
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    pub fn set_repository(&mut self, link: impl Into<String>) -> Result<(), ValidationError> {
        let link = link.into();
        item_validation::validate_text("repository", &link)?;
        self.repository = Some(link.trim().to_string());
        Ok(())
    }
}

impl Plannable for Project {
    fn core(&self) -> &ItemCore {
        &self.core
    }

    fn item_type(&self) -> ItemKind {
        ItemKind::Project
    }

    fn calculate_time_commitment(&self) -> f64 {
        // team_size >= 1 is enforced by the constructor and by validate_item.
        HOURS_PER_MILESTONE * f64::from(self.num_milestones) / f64::from(self.team_size.max(1))
    }

    fn priority(&self, reference: NaiveDate) -> Priority {
        priority::project_priority(
            self.core.days_until_due(reference),
            self.calculate_time_commitment(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    #[serde(flatten)]
    pub(crate) core: ItemCore,
    #[serde(default)]
    pub(crate) exam_type: ExamType,
    pub(crate) num_chapters: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) study_guide: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) location: Option<String>,
}

impl Exam {
    pub fn new(
        title: impl Into<String>,
        due_date: NaiveDate,
        course_code: impl Into<String>,
        weight: f64,
        exam_type: ExamType,
        num_chapters: u32,
    ) -> Result<Self, ValidationError> {
        let core = ItemCore::new(title, due_date, course_code, weight)?;
        Ok(Self {
            core,
            exam_type,
            num_chapters,
            study_guide: None,
            location: None,
        })
    }

    pub fn exam_type(&self) -> ExamType {
        self.exam_type
    }

    pub fn num_chapters(&self) -> u32 {
        self.num_chapters
    }

    pub fn study_guide(&self) -> Option<&str> {
        self.study_guide.as_deref()
    }

    pub fn set_study_guide(&mut self, guide: impl Into<String>) -> Result<(), ValidationError> {
        let guide = guide.into();
        item_validation::validate_text("study guide", &guide)?;
        self.study_guide = Some(guide.trim().to_string());
        Ok(())
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn set_location(&mut self, location: impl Into<String>) -> Result<(), ValidationError> {
        let location = location.into();
        item_validation::validate_text("location", &location)?;
        self.location = Some(location.trim().to_string());
        Ok(())
    }
}

impl Plannable for Exam {
    fn core(&self) -> &ItemCore {
        &self.core
    }

    fn item_type(&self) -> ItemKind {
        ItemKind::Exam
    }

    fn calculate_time_commitment(&self) -> f64 {
        let study = STUDY_HOURS_PER_CHAPTER * f64::from(self.num_chapters);
        match self.exam_type {
            ExamType::Final => study + FINAL_EXAM_BONUS_HOURS,
            ExamType::Quiz | ExamType::Midterm | ExamType::General => study,
        }
    }

    fn priority(&self, reference: NaiveDate) -> Priority {
        priority::exam_priority(self.core.days_until_due(reference))
    }
}

/// Closed set of academic items. Persisted as one JSON object per item with a
/// `"type"` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AcademicItem {
    Assignment(Assignment),
    Project(Project),
    Exam(Exam),
}

impl AcademicItem {
    fn as_plannable(&self) -> &dyn Plannable {
        match self {
            AcademicItem::Assignment(item) => item,
            AcademicItem::Project(item) => item,
            AcademicItem::Exam(item) => item,
        }
    }

    fn core_mut(&mut self) -> &mut ItemCore {
        match self {
            AcademicItem::Assignment(item) => &mut item.core,
            AcademicItem::Project(item) => &mut item.core,
            AcademicItem::Exam(item) => &mut item.core,
        }
    }

    pub fn title(&self) -> &str {
        self.core().title()
    }

    pub fn due_date(&self) -> NaiveDate {
        self.core().due_date()
    }

    pub fn course_code(&self) -> &str {
        self.core().course_code()
    }

    pub fn weight(&self) -> f64 {
        self.core().weight()
    }

    pub fn status(&self) -> ItemStatus {
        self.core().status()
    }

    pub fn days_until_due(&self, reference: NaiveDate) -> i64 {
        self.core().days_until_due(reference)
    }

    pub fn is_overdue(&self, reference: NaiveDate) -> bool {
        self.core().is_overdue(reference)
    }

    pub fn is_completed(&self) -> bool {
        self.core().is_completed()
    }

    pub fn set_status(&mut self, status: ItemStatus) {
        self.core_mut().set_status(status);
    }

    pub fn mark_completed(
        &mut self,
        score: f64,
        submission_date: Option<NaiveDate>,
    ) -> Result<(), ValidationError> {
        self.core_mut().mark_completed(score, submission_date)
    }

    pub fn as_assignment_mut(&mut self) -> Option<&mut Assignment> {
        match self {
            AcademicItem::Assignment(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_project_mut(&mut self) -> Option<&mut Project> {
        match self {
            AcademicItem::Project(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_exam_mut(&mut self) -> Option<&mut Exam> {
        match self {
            AcademicItem::Exam(item) => Some(item),
            _ => None,
        }
    }
}

impl Plannable for AcademicItem {
    fn core(&self) -> &ItemCore {
        self.as_plannable().core()
    }

    fn item_type(&self) -> ItemKind {
        self.as_plannable().item_type()
    }

    fn calculate_time_commitment(&self) -> f64 {
        self.as_plannable().calculate_time_commitment()
    }

    fn priority(&self, reference: NaiveDate) -> Priority {
        self.as_plannable().priority(reference)
    }
}

impl From<Assignment> for AcademicItem {
    fn from(value: Assignment) -> Self {
        AcademicItem::Assignment(value)
    }
}

impl From<Project> for AcademicItem {
    fn from(value: Project) -> Self {
        AcademicItem::Project(value)
    }
}

impl From<Exam> for AcademicItem {
    fn from(value: Exam) -> Self {
        AcademicItem::Exam(value)
    }
}

impl fmt::Display for AcademicItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} due {}",
            self.title(),
            self.course_code(),
            self.item_type(),
            self.due_date()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn constructors_share_core_validation() {
        let due = d(2025, 12, 1);
        assert_eq!(
            Assignment::new("  ", due, "INST326", 10.0, 2.0).unwrap_err(),
            ValidationError::EmptyTitle
        );
        assert_eq!(
            Project::new("P", due, "INST326", -5.0, 2, 2).unwrap_err(),
            ValidationError::InvalidWeight(-5.0)
        );
        assert_eq!(
            Exam::new("", due, "INST326", 10.0, ExamType::Quiz, 1).unwrap_err(),
            ValidationError::EmptyTitle
        );
    }

    #[test]
    fn title_is_trimmed_and_course_code_kept_verbatim() {
        let a = Assignment::new("  HW1 ", d(2025, 12, 1), "inst326", 5.0, 1.0).unwrap();
        assert_eq!(a.core().title(), "HW1");
        assert_eq!(a.core().course_code(), "inst326");
    }

    #[test]
    fn project_rejects_zero_team_or_milestones() {
        let due = d(2025, 12, 1);
        assert!(matches!(
            Project::new("P", due, "C", 10.0, 2, 0),
            Err(ValidationError::NonPositive { field: "team_size", .. })
        ));
        assert!(matches!(
            Project::new("P", due, "C", 10.0, 0, 2),
            Err(ValidationError::NonPositive { field: "num_milestones", .. })
        ));
    }

    #[test]
    fn final_exam_adds_bonus_hours() {
        let due = d(2025, 12, 1);
        let midterm = Exam::new("Mid", due, "C", 20.0, ExamType::Midterm, 4).unwrap();
        let fin = Exam::new("Final", due, "C", 20.0, ExamType::Final, 4).unwrap();
        assert_eq!(midterm.calculate_time_commitment(), 12.0);
        assert_eq!(
            fin.calculate_time_commitment(),
            12.0 + FINAL_EXAM_BONUS_HOURS
        );
    }

    #[test]
    fn mutators_leave_core_fields_alone() {
        let due = d(2025, 12, 10);
        let mut project = Project::new("Capstone", due, "INST490", 40.0, 3, 2).unwrap();
        let before = project.core().clone();
        project.add_milestone("Proposal", d(2025, 11, 1)).unwrap();
        project.set_repository("https://example.org/capstone").unwrap();
        assert_eq!(project.core(), &before);
        assert_eq!(project.milestones().len(), 1);
        assert!(project.add_milestone(" ", d(2025, 11, 2)).is_err());
        assert!(project.set_repository("").is_err());
    }

    #[test]
    fn mark_completed_validates_score() {
        let mut item: AcademicItem =
            Assignment::new("HW", d(2025, 12, 1), "C", 5.0, 1.0).unwrap().into();
        assert!(item.mark_completed(120.0, None).is_err());
        assert!(!item.is_completed());
        item.mark_completed(95.0, Some(d(2025, 11, 30))).unwrap();
        assert!(item.is_completed());
        assert_eq!(item.core().score(), Some(95.0));
        assert!(!item.is_overdue(d(2026, 1, 1)));
    }

    #[test]
    fn item_kind_and_exam_type_parse_from_text() {
        assert_eq!("project".parse::<ItemKind>().unwrap(), ItemKind::Project);
        assert!("lab".parse::<ItemKind>().is_err());
        assert_eq!("FINAL".parse::<ExamType>().unwrap(), ExamType::Final);
        assert_eq!("".parse::<ExamType>().unwrap(), ExamType::General);
    }
}
