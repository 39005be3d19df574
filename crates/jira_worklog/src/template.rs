//! Work-log URL templates with `{0}` (issue id) and `{1}` (issue key) placeholders.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, WorklogError};

const ID_PLACEHOLDER: &str = "{0}";
const KEY_PLACEHOLDER: &str = "{1}";
const TIMESHEET_PATH: &str = "/rest/com.deniz.jira.worklog/1.0/timesheet/issueId?targetKey={0}";
const TIMESHEET_MARKER: &str = "com.deniz";

static BROWSE_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(http.*?browse/)(.*?)(\?.*)").expect("invalid browse url regex"));

/// Where an issue's work logs are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorklogSource {
    /// Timesheet plugin REST endpoint answering JSON.
    Timesheet,
    /// Jira's built-in Work Log tab answering HTML.
    IssueTab,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogUrlTemplate {
    template: String,
    source: WorklogSource,
}

impl WorklogUrlTemplate {
    /// Accepts any template carrying at least one placeholder.
    pub fn new(template: impl Into<String>, source: WorklogSource) -> Result<Self> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) && !template.contains(KEY_PLACEHOLDER) {
            return Err(WorklogError::InvalidTemplate(template));
        }
        Ok(Self { template, source })
    }

    /// Template for the worklog-timesheet plugin endpoint, keyed by issue id.
    pub fn timesheet(base_url: &str) -> Self {
        Self {
            template: format!("{}{}", base_url.trim_end_matches('/'), TIMESHEET_PATH),
            source: WorklogSource::Timesheet,
        }
    }

    /// Derives the template from the href of the issue page's "Work Log" tab.
    pub fn from_tab_href(base_url: &str, href: &str) -> Result<Self> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), href);
        if url.contains(TIMESHEET_MARKER) {
            return Ok(Self::timesheet(base_url));
        }
        let rewritten = BROWSE_KEY_REGEX.replace(&url, "${1}{1}${3}").into_owned();
        Self::new(rewritten, WorklogSource::IssueTab)
    }

    /// Which endpoint the template points at.
    pub fn source(&self) -> WorklogSource {
        self.source
    }

    /// Template text with its `{0}`/`{1}` placeholders.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Fills `{0}` with the issue id and `{1}` with the issue key.
    pub fn render(&self, issue_id: &str, issue_key: &str) -> String {
        self.template
            .replace(ID_PLACEHOLDER, issue_id)
            .replace(KEY_PLACEHOLDER, issue_key)
    }
}
