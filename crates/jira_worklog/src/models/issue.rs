//! Quick-edit issue metadata and time-tracking figures used to seed a burn-down.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::duration::parse_time_budget;

static DUE_DATE_INPUT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"id=.duedate.*?value=.(\d+/.{1,3}/.{2,4}).>").expect("invalid due date regex")
});
static ORIGINAL_ESTIMATE_INPUT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"id=.timetracking_originalestimate.*?value=.([\d\w\s]*?)./>")
        .expect("invalid original estimate regex")
});

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Response of `QuickEditIssue!default.jspa`, a list of editable fields with their rendered HTML.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuickEditIssue {
    #[serde(default)]
    pub fields: Vec<EditField>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EditField {
    pub id: String,
    #[serde(default)]
    pub edit_html: Option<String>,
}

impl QuickEditIssue {
    fn field_html(&self, id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.id == id)
            .and_then(|field| field.edit_html.as_deref())
    }

    /// Due date held by the `duedate` input, if set.
    pub fn due_date(&self) -> Option<NaiveDate> {
        let html = self.field_html("duedate")?;
        let captures = DUE_DATE_INPUT_REGEX.captures(html)?;
        parse_short_date(&captures[1])
    }

    /// Original estimate, in seconds, held by the time-tracking input.
    pub fn original_estimate(&self) -> Option<i64> {
        let html = self.field_html("timetracking")?;
        let captures = ORIGINAL_ESTIMATE_INPUT_REGEX.captures(html)?;
        Some(parse_time_budget(captures[1].trim()))
    }
}

/// Parses Jira's short `dd/Mon/yy` date; two-digit years are taken as 20yy.
pub fn parse_short_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split('/');
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let month_text = parts.next()?.trim();
    let year_text = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }

    let month = MONTH_ABBREVIATIONS
        .iter()
        .position(|name| name.eq_ignore_ascii_case(month_text))? as u32
        + 1;
    let year = year_text.parse::<i32>().ok()?;
    let year = if year < 100 { 2000 + year } else { year };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Time-tracking figures of an issue, all in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeTracking {
    pub original_estimate: Option<i64>,
    pub remaining: i64,
    pub logged: i64,
}

impl TimeTracking {
    pub fn new(remaining: i64, logged: i64) -> Self {
        Self {
            original_estimate: None,
            remaining,
            logged,
        }
    }

    /// Builds figures from the visible tracking texts; an empty original estimate stays unset.
    pub fn from_texts(original: Option<&str>, remaining: &str, logged: &str) -> Self {
        Self {
            original_estimate: original
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(parse_time_budget),
            remaining: parse_time_budget(remaining.trim()),
            logged: parse_time_budget(logged.trim()),
        }
    }

    pub fn with_original_estimate(mut self, seconds: i64) -> Self {
        self.original_estimate = Some(seconds);
        self
    }

    /// Effort the burn-down starts from: what was logged plus what remains.
    ///
    /// With neither figure known the original estimate stands in, or 0 without one.
    pub fn total_estimate(&self) -> i64 {
        let tracked = self.logged.saturating_add(self.remaining);
        if tracked == 0 {
            self.original_estimate.unwrap_or(0)
        } else {
            tracked
        }
    }

    /// True when the total can only come from an original estimate that is not known yet.
    pub fn needs_original_estimate(&self) -> bool {
        self.logged == 0 && self.remaining == 0 && self.original_estimate.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quick_edit() -> QuickEditIssue {
        serde_json::from_value(json!({
            "fields": [
                {"id": "summary", "label": "Summary", "editHtml": "<input id='summary' value='Fix login'/>"},
                {"id": "duedate", "label": "Due Date",
                 "editHtml": "<div><input class='text' id='duedate' name='duedate' value='25/Oct/19'></div>"},
                {"id": "timetracking", "label": "Time Tracking",
                 "editHtml": "<input id='timetracking_originalestimate' name='x' value='2d 4h'/>"}
            ]
        }))
        .expect("quick edit payload should decode")
    }

    #[test]
    fn reads_due_date_and_original_estimate() {
        let issue = quick_edit();
        assert_eq!(issue.due_date(), NaiveDate::from_ymd_opt(2019, 10, 25));
        assert_eq!(issue.original_estimate(), Some(2 * 8 * 3600 + 4 * 3600));
    }

    #[test]
    fn missing_fields_yield_none() {
        let issue = QuickEditIssue::default();
        assert_eq!(issue.due_date(), None);
        assert_eq!(issue.original_estimate(), None);
    }

    #[test]
    fn short_date_parsing() {
        assert_eq!(parse_short_date("7/Oct/19"), NaiveDate::from_ymd_opt(2019, 10, 7));
        assert_eq!(parse_short_date("01/jan/2021"), NaiveDate::from_ymd_opt(2021, 1, 1));
        assert_eq!(parse_short_date("31/Feb/19"), None);
        assert_eq!(parse_short_date("7/Foo/19"), None);
        assert_eq!(parse_short_date("2019-10-07"), None);
    }

    #[test]
    fn total_estimate_is_logged_plus_remaining() {
        let tracking = TimeTracking::from_texts(Some(""), "1d", "3h");
        assert_eq!(tracking.original_estimate, None);
        assert_eq!(tracking.total_estimate(), 8 * 3600 + 3 * 3600);

        let tracking = TimeTracking::new(100, 20).with_original_estimate(60);
        assert_eq!(tracking.original_estimate, Some(60));
        assert_eq!(tracking.total_estimate(), 120);
        assert!(!tracking.needs_original_estimate());
    }

    #[test]
    fn original_estimate_stands_in_when_nothing_is_tracked() {
        let tracking = TimeTracking::from_texts(None, "", "");
        assert!(tracking.needs_original_estimate());
        assert_eq!(tracking.total_estimate(), 0);

        let tracking = tracking.with_original_estimate(3 * 3600);
        assert!(!tracking.needs_original_estimate());
        assert_eq!(tracking.total_estimate(), 3 * 3600);

        let tracking = TimeTracking::from_texts(Some("1d"), "", "");
        assert_eq!(tracking.total_estimate(), 8 * 3600);
    }

    #[test]
    fn huge_tracking_figures_saturate() {
        assert_eq!(TimeTracking::new(i64::MAX, i64::MAX).total_estimate(), i64::MAX);
    }
}
