use crate::item::{AcademicItem, ItemKind, ItemStatus, Plannable};
use crate::item_validation::ValidationError;
use crate::priority::Priority;
use crate::utils::format_course_code;
use crate::workload::{self, CompletionStats, PrioritySummary, WorkloadDistribution};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error("no item titled '{title}' in the planner")]
    NotFound { title: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Owns one student's academic items and answers aggregate queries over them.
///
/// Items keep insertion order and duplicates are allowed. Every date-relative
/// query takes an explicit reference date; nothing here reads the clock, and
/// no query mutates the items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AcademicPlanner {
    owner_name: String,
    items: Vec<AcademicItem>,
}

impl AcademicPlanner {
    pub fn new(owner_name: impl Into<String>) -> Self {
        Self {
            owner_name: owner_name.into().trim().to_string(),
            items: Vec::new(),
        }
    }

    pub fn with_items(owner_name: impl Into<String>, items: Vec<AcademicItem>) -> Self {
        let mut planner = Self::new(owner_name);
        planner.items = items;
        planner
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn set_owner_name(&mut self, owner_name: impl Into<String>) {
        self.owner_name = owner_name.into().trim().to_string();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add_item(&mut self, item: impl Into<AcademicItem>) {
        let item = item.into();
        debug!(title = item.title(), kind = %item.item_type(), "adding item");
        self.items.push(item);
    }

    /// Removes the first entry equal to `item`.
    pub fn remove_item(&mut self, item: &AcademicItem) -> Result<AcademicItem, PlannerError> {
        let idx = self.items.iter().position(|candidate| candidate == item);
        self.take_at(idx, item.title())
    }

    pub fn remove_item_by_title(&mut self, title: &str) -> Result<AcademicItem, PlannerError> {
        let idx = self
            .items
            .iter()
            .position(|candidate| candidate.title() == title.trim());
        self.take_at(idx, title)
    }

    pub fn remove_item_by_title_and_course(
        &mut self,
        title: &str,
        course_code: &str,
    ) -> Result<AcademicItem, PlannerError> {
        let idx = self.items.iter().position(|candidate| {
            candidate.title() == title.trim() && same_course(candidate.course_code(), course_code)
        });
        self.take_at(idx, title)
    }

    fn take_at(&mut self, idx: Option<usize>, title: &str) -> Result<AcademicItem, PlannerError> {
        match idx {
            Some(idx) => {
                let removed = self.items.remove(idx);
                debug!(title = removed.title(), "removed item");
                Ok(removed)
            }
            None => Err(PlannerError::NotFound {
                title: title.trim().to_string(),
            }),
        }
    }

    pub fn find_item(&self, title: &str) -> Option<&AcademicItem> {
        self.items.iter().find(|item| item.title() == title.trim())
    }

    pub fn find_item_mut(&mut self, title: &str) -> Option<&mut AcademicItem> {
        self.items.iter_mut().find(|item| item.title() == title.trim())
    }

    /// Applies `update` to the first item titled `title`.
    pub fn update_item<F>(&mut self, title: &str, update: F) -> Result<(), PlannerError>
    where
        F: FnOnce(&mut AcademicItem) -> Result<(), ValidationError>,
    {
        let item = self
            .find_item_mut(title)
            .ok_or_else(|| PlannerError::NotFound {
                title: title.trim().to_string(),
            })?;
        update(item)?;
        Ok(())
    }

    pub fn items(&self) -> &[AcademicItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<AcademicItem> {
        self.items
    }

    pub fn items_by_type(&self, kind: ItemKind) -> Vec<&AcademicItem> {
        self.items
            .iter()
            .filter(|item| item.item_type() == kind)
            .collect()
    }

    pub fn items_by_priority(&self, band: Priority, reference: NaiveDate) -> Vec<&AcademicItem> {
        self.items
            .iter()
            .filter(|item| item.priority(reference) == band)
            .collect()
    }

    pub fn items_by_course(&self, course_code: &str) -> Vec<&AcademicItem> {
        self.items
            .iter()
            .filter(|item| same_course(item.course_code(), course_code))
            .collect()
    }

    pub fn items_by_status(&self, status: ItemStatus) -> Vec<&AcademicItem> {
        self.items
            .iter()
            .filter(|item| item.status() == status)
            .collect()
    }

    /// Incomplete items whose due date is before `reference`.
    pub fn overdue_items(&self, reference: NaiveDate) -> Vec<&AcademicItem> {
        self.items
            .iter()
            .filter(|item| item.is_overdue(reference))
            .collect()
    }

    /// Sum of every item's time commitment, regardless of dates or status.
    pub fn total_workload(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.calculate_time_commitment())
            .fold(0.0, |acc, hours| acc + hours)
    }

    /// Like `total_workload`, skipping completed items.
    pub fn remaining_workload(&self) -> f64 {
        self.items
            .iter()
            .filter(|item| !item.is_completed())
            .map(|item| item.calculate_time_commitment())
            .fold(0.0, |acc, hours| acc + hours)
    }

    /// Weekly buckets `0..=weeks_ahead`; week 0 starts on `reference`.
    /// Completed items are skipped.
    pub fn calculate_weekly_workload(
        &self,
        weeks_ahead: u32,
        reference: NaiveDate,
    ) -> WorkloadDistribution {
        workload::distribute_workload(&self.items, reference, workload::DAYS_PER_WEEK, weeks_ahead)
    }

    /// Daily buckets `0..=days_ahead`; day 0 is `reference`.
    pub fn calculate_daily_workload(
        &self,
        days_ahead: u32,
        reference: NaiveDate,
    ) -> WorkloadDistribution {
        workload::distribute_workload(&self.items, reference, 1, days_ahead)
    }

    pub fn priority_summary(&self, reference: NaiveDate) -> PrioritySummary {
        PrioritySummary::from_items(&self.items, reference)
    }

    /// Incomplete items due between `reference` and `reference + days_ahead`
    /// inclusive, earliest first. Ties keep insertion order.
    pub fn upcoming_deadlines(&self, days_ahead: u32, reference: NaiveDate) -> Vec<&AcademicItem> {
        let horizon = i64::from(days_ahead);
        let mut upcoming: Vec<&AcademicItem> = self
            .items
            .iter()
            .filter(|item| !item.is_completed())
            .filter(|item| (0..=horizon).contains(&item.days_until_due(reference)))
            .collect();
        upcoming.sort_by_key(|item| item.due_date());
        upcoming
    }

    pub fn completion_stats(&self) -> CompletionStats {
        CompletionStats::from_items(&self.items)
    }
}

impl fmt::Display for AcademicPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.completion_stats();
        write!(
            f,
            "Academic planner for {}: {} items ({} completed, {} in progress)",
            self.owner_name, stats.total_items, stats.completed, stats.in_progress
        )
    }
}

fn same_course(stored: &str, wanted: &str) -> bool {
    match (format_course_code(stored), format_course_code(wanted)) {
        (Ok(a), Ok(b)) => a == b,
        _ => stored.trim() == wanted.trim(),
    }
}
