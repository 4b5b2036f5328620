use crate::item::{AcademicItem, ItemStatus, Plannable};
use crate::priority::Priority;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DAYS_PER_WEEK: u32 = 7;
/// Longest weekly look-ahead accepted from user input, about ten years.
pub const MAX_WEEKS_AHEAD: u32 = 520;

/// Hours due per window, counted forward from a reference date.
///
/// Bucket `k` covers the days `[k * window_days, (k + 1) * window_days - 1]`
/// after the reference date. Every bucket in range is present, empty ones
/// with `0.0`. Items already past due are totalled separately in
/// `past_due_hours` and never folded into bucket 0. Completed items are left
/// out entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadDistribution {
    pub reference_date: NaiveDate,
    pub window_days: u32,
    pub buckets: BTreeMap<u32, f64>,
    pub past_due_hours: f64,
    pub past_due_count: usize,
}

impl WorkloadDistribution {
    pub fn hours(&self, bucket: u32) -> f64 {
        self.buckets.get(&bucket).copied().unwrap_or(0.0)
    }

    pub fn scheduled_hours(&self) -> f64 {
        self.buckets.values().fold(0.0, |acc, hours| acc + hours)
    }

    /// First day of `bucket`, or `None` past the end of the calendar.
    pub fn window_start(&self, bucket: u32) -> Option<NaiveDate> {
        let offset = u64::from(bucket) * u64::from(self.window_days);
        self.reference_date.checked_add_days(Days::new(offset))
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts: Vec<String> = self
            .buckets
            .iter()
            .map(|(bucket, hours)| match self.window_start(*bucket) {
                Some(start) => format!("{start}={hours:.2}h"),
                None => format!("#{bucket}={hours:.2}h"),
            })
            .collect();
        if self.past_due_count > 0 {
            parts.push(format!(
                "past_due={:.2}h ({} items)",
                self.past_due_hours, self.past_due_count
            ));
        }
        parts.join(", ")
    }
}

pub fn distribute_workload<'a, I>(
    items: I,
    reference: NaiveDate,
    window_days: u32,
    last_bucket: u32,
) -> WorkloadDistribution
where
    I: IntoIterator<Item = &'a AcademicItem>,
{
    let window = i64::from(window_days.max(1));
    let mut buckets: BTreeMap<u32, f64> = (0..=last_bucket).map(|k| (k, 0.0)).collect();
    let mut past_due_hours = 0.0;
    let mut past_due_count = 0;

    for item in items.into_iter().filter(|item| !item.is_completed()) {
        let days = item.days_until_due(reference);
        if days < 0 {
            past_due_hours += item.calculate_time_commitment();
            past_due_count += 1;
            continue;
        }
        let bucket = days / window;
        if bucket > i64::from(last_bucket) {
            continue;
        }
        if let Some(hours) = buckets.get_mut(&(bucket as u32)) {
            *hours += item.calculate_time_commitment();
        }
    }

    WorkloadDistribution {
        reference_date: reference,
        window_days: window_days.max(1),
        buckets,
        past_due_hours,
        past_due_count,
    }
}

/// Item counts per priority band; all four bands are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrioritySummary {
    counts: BTreeMap<Priority, usize>,
}

impl PrioritySummary {
    pub fn from_items<'a, I>(items: I, reference: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a AcademicItem>,
    {
        let mut counts: BTreeMap<Priority, usize> =
            Priority::ALL.iter().map(|band| (*band, 0)).collect();
        for item in items {
            *counts.entry(item.priority(reference)).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, band: Priority) -> usize {
        self.counts.get(&band).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Priority, usize)> + '_ {
        self.counts.iter().map(|(band, count)| (*band, *count))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionStats {
    pub total_items: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    /// Percentage of completed items, rounded to two decimals.
    pub completion_rate: f64,
    /// Mean of recorded scores, rounded to two decimals; 0 when nothing is scored.
    pub average_score: f64,
}

impl CompletionStats {
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a AcademicItem>,
    {
        let mut stats = CompletionStats {
            total_items: 0,
            completed: 0,
            in_progress: 0,
            not_started: 0,
            completion_rate: 0.0,
            average_score: 0.0,
        };
        let mut score_total = 0.0;
        let mut scored = 0usize;

        for item in items {
            stats.total_items += 1;
            match item.status() {
                ItemStatus::Completed => stats.completed += 1,
                ItemStatus::InProgress => stats.in_progress += 1,
                ItemStatus::NotStarted => stats.not_started += 1,
            }
            if let Some(score) = item.core().score() {
                score_total += score;
                scored += 1;
            }
        }

        if stats.total_items > 0 {
            stats.completion_rate =
                round2(stats.completed as f64 / stats.total_items as f64 * 100.0);
        }
        if scored > 0 {
            stats.average_score = round2(score_total / scored as f64);
        }
        stats
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
