//! Work-log extraction from the HTML fragments Jira renders when no timesheet plugin is installed.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::duration::parse_time_budget;
use crate::models::{parse_short_date, WorkLogEntry};

static CREATED_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'Created: (\d+/\w+/\d+) \d+:\d+ .M'").expect("invalid created marker regex")
});
static WORKLOG_DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"worklog-duration.+>(.*?)<").expect("invalid worklog duration regex")
});
static ISSUE_TAB_ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<span\sclass=date>(.*?)<(?:.*?\n)*?.*?duration.>(.*?)<")
        .expect("invalid issue tab entry regex")
});

/// Which HTML rendering a text response is expected to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlLayout {
    /// The issue's own Work Log tab: one `<span class=date>` block per entry.
    IssueTab,
    /// A sub-task panel: a single `Created:` marker followed by duration fragments.
    SubtaskPanel,
}

impl HtmlLayout {
    pub fn scrape(self, html: &str, offset: &FixedOffset) -> Vec<WorkLogEntry> {
        match self {
            HtmlLayout::IssueTab => scrape_issue_tab(html, offset),
            HtmlLayout::SubtaskPanel => scrape_subtask_panel(html, offset),
        }
    }
}

/// Every duration fragment becomes an entry dated at the panel's `Created:` day.
pub fn scrape_subtask_panel(html: &str, offset: &FixedOffset) -> Vec<WorkLogEntry> {
    let base_date = CREATED_MARKER_REGEX
        .captures(html)
        .and_then(|captures| parse_short_date(&captures[1]));

    let durations: Vec<i64> = WORKLOG_DURATION_REGEX
        .captures_iter(html)
        .map(|captures| parse_time_budget(&captures[1]))
        .collect();

    let Some(base_date) = base_date else {
        if !durations.is_empty() {
            warn!(
                fragments = durations.len(),
                "Sub-task worklog fragments found without a Created marker; skipping"
            );
        }
        return Vec::new();
    };
    let Some(work_start) = start_of_day(base_date, offset) else {
        return Vec::new();
    };

    durations
        .into_iter()
        .map(|seconds| WorkLogEntry::new(work_start, seconds))
        .collect()
}

/// One entry per `<span class=date>` block; blocks with an unreadable date are dropped.
pub fn scrape_issue_tab(html: &str, offset: &FixedOffset) -> Vec<WorkLogEntry> {
    ISSUE_TAB_ENTRY_REGEX
        .captures_iter(html)
        .filter_map(|captures| {
            let date_text = captures[1].trim();
            match parse_worklog_date(date_text, offset) {
                Some(work_start) => Some(WorkLogEntry::new(
                    work_start,
                    parse_time_budget(captures[2].trim()),
                )),
                None => {
                    debug!(date = date_text, "Skipping worklog block with unreadable date");
                    None
                }
            }
        })
        .collect()
}

/// Reads the date formats Jira prints next to work-log entries, in the given wall-clock offset.
pub fn parse_worklog_date(text: &str, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return start_of_day(date, offset);
    }

    let (date_part, time_part) = match text.split_once(' ') {
        Some((date, time)) => (date, Some(time.trim())),
        None => (text, None),
    };
    let date = parse_short_date(date_part)?;
    let time = match time_part {
        Some(time) => NaiveTime::parse_from_str(time, "%I:%M %p").ok()?,
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };
    local_to_utc(date.and_time(time), offset)
}

fn start_of_day(date: NaiveDate, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    local_to_utc(date.and_hms_opt(0, 0, 0)?, offset)
}

fn local_to_utc(local: NaiveDateTime, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&local)
        .single()
        .map(|instant| instant.with_timezone(&Utc))
}
