//! Daily remaining-effort series and the two-point reference line of a burn-down chart.
//!
//! Everything here is pure: entries come in already fetched, the series comes out
//! ready for a renderer, and gaps are `None` rather than zero.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Weekday};
use serde::Serialize;

use crate::config::{utc, DEFAULT_MAX_CHART_DAYS};
use crate::models::WorkLogEntry;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Knobs for the day walk.
#[derive(Debug, Clone, Copy)]
pub struct BurndownOptions {
    /// Business days kept at most; the walk stops once this many labels exist.
    pub max_days: usize,
    /// Offset whose calendar decides which day an entry belongs to.
    pub utc_offset: FixedOffset,
}

impl Default for BurndownOptions {
    fn default() -> Self {
        Self {
            max_days: DEFAULT_MAX_CHART_DAYS,
            utc_offset: utc(),
        }
    }
}

/// Work logged on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    /// Durations in seconds, in chronological order.
    pub items: Vec<i64>,
    pub daily_burned_seconds: i64,
    /// Remaining effort once this day's entries are applied.
    pub daily_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnDownSeries {
    pub days: Vec<String>,
    pub reference_line: Vec<Option<i64>>,
    pub actual_line: Vec<Option<i64>>,
}

impl BurnDownSeries {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Result of a burn-down computation; callers must branch on the empty case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "series", rename_all = "snake_case")]
pub enum BurndownOutcome {
    Series(BurnDownSeries),
    NoWorkLogData,
}

impl BurndownOutcome {
    pub fn series(&self) -> Option<&BurnDownSeries> {
        match self {
            BurndownOutcome::Series(series) => Some(series),
            BurndownOutcome::NoWorkLogData => None,
        }
    }
}

/// Merges root and sub-task entries and sorts them by start; equal starts keep their input order.
pub fn merge_entries(root: Vec<WorkLogEntry>, subtasks: Vec<WorkLogEntry>) -> Vec<WorkLogEntry> {
    let mut merged = root;
    merged.extend(subtasks);
    // `sort_by` is stable.
    merged.sort_by(|a, b| a.work_start.cmp(&b.work_start));
    merged
}

/// Buckets sorted entries by calendar date, drawing `total_estimate` down as it goes.
pub fn bucket_entries(
    sorted: &[WorkLogEntry],
    total_estimate: i64,
    offset: &FixedOffset,
) -> BTreeMap<NaiveDate, DailyBucket> {
    let mut buckets: BTreeMap<NaiveDate, DailyBucket> = BTreeMap::new();
    let mut current_remaining = total_estimate;

    for entry in sorted {
        current_remaining = current_remaining.saturating_sub(entry.time_spent);
        let bucket = buckets
            .entry(entry.calendar_day(offset))
            .or_insert_with(|| DailyBucket {
                items: Vec::new(),
                daily_burned_seconds: 0,
                daily_remaining: current_remaining,
            });
        bucket.items.push(entry.time_spent);
        bucket.daily_burned_seconds = bucket.daily_burned_seconds.saturating_add(entry.time_spent);
        bucket.daily_remaining = current_remaining;
    }

    buckets
}

/// Saturday and Sunday are the only days off.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Business days from `first` to `last` inclusive, at most `limit` of them.
pub fn business_days(first: NaiveDate, last: NaiveDate, limit: usize) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = first;
    while current <= last && days.len() < limit {
        if is_business_day(current) {
            days.push(current);
        }
        current += Duration::days(1);
    }
    days
}

/// `"Oct, 7"` style label.
pub fn day_label(date: NaiveDate) -> String {
    format!("{}, {}", MONTH_LABELS[date.month0() as usize], date.day())
}

/// Builds the chart series with default options.
pub fn build_burndown_series(
    root: Vec<WorkLogEntry>,
    subtasks: Vec<WorkLogEntry>,
    total_estimate: i64,
    due_date: NaiveDate,
) -> BurndownOutcome {
    build_burndown_series_with(&BurndownOptions::default(), root, subtasks, total_estimate, due_date)
}

/// Builds the chart series: one label per business day from the first log to the later of
/// the last log and `due_date`, remaining effort on days with logs, and the reference line's
/// two endpoints. Yields `NoWorkLogData` when there are no entries at all.
pub fn build_burndown_series_with(
    options: &BurndownOptions,
    root: Vec<WorkLogEntry>,
    subtasks: Vec<WorkLogEntry>,
    total_estimate: i64,
    due_date: NaiveDate,
) -> BurndownOutcome {
    let sorted = merge_entries(root, subtasks);
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return BurndownOutcome::NoWorkLogData;
    };

    let offset = &options.utc_offset;
    let first_log_day = first.calendar_day(offset);
    let last_log_day = last.calendar_day(offset);
    let buckets = bucket_entries(&sorted, total_estimate, offset);
    let last_day = last_log_day.max(due_date);

    let walk = business_days(first_log_day, last_day, options.max_days);
    let final_index = walk.len().saturating_sub(1);

    let mut series = BurnDownSeries {
        days: Vec::with_capacity(walk.len()),
        reference_line: Vec::with_capacity(walk.len()),
        actual_line: Vec::with_capacity(walk.len()),
    };
    for (index, day) in walk.into_iter().enumerate() {
        series.days.push(day_label(day));
        series
            .actual_line
            .push(buckets.get(&day).map(|bucket| bucket.daily_remaining));
        // Only the endpoints of the reference line carry values.
        let reference = if index == 0 {
            Some(total_estimate)
        } else if index == final_index {
            Some(0)
        } else {
            None
        };
        series.reference_line.push(reference);
    }

    BurndownOutcome::Series(series)
}
