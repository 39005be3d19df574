//! Raw fetch payloads and their normalization into canonical work-log entries.

use chrono::FixedOffset;
use serde_json::Value;

use crate::error::Result;
use crate::models::{TimesheetResponse, WorkLogEntry};
use crate::scrape::HtmlLayout;

/// Body returned by the fetch capability, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Json(Value),
    Text(String),
}

impl RawResponse {
    /// Treats a body as JSON when it parses as such, text otherwise.
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) if value.is_object() || value.is_array() => RawResponse::Json(value),
            _ => RawResponse::Text(body),
        }
    }
}

/// A work-log response after its shape has been recognised.
#[derive(Debug, Clone)]
pub enum WorklogResponse {
    /// Structured timesheet payload carrying `projects[0].issues[0].workLogs`.
    Timesheet(TimesheetResponse),
    /// Anything else, scraped as HTML.
    Html(String),
}

impl WorklogResponse {
    /// Recognises the payload shape. A payload with the timesheet path is never scraped;
    /// if its envelope does not decode the error is returned instead.
    pub fn classify(raw: RawResponse) -> Result<Self> {
        match raw {
            RawResponse::Json(value) => {
                if TimesheetResponse::matches(&value) {
                    Ok(WorklogResponse::Timesheet(TimesheetResponse::decode(value)?))
                } else {
                    Ok(WorklogResponse::Html(value.to_string()))
                }
            }
            RawResponse::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) if TimesheetResponse::matches(&value) => {
                    Ok(WorklogResponse::Timesheet(TimesheetResponse::decode(value)?))
                }
                _ => Ok(WorklogResponse::Html(text)),
            },
        }
    }

    /// Canonical entries; HTML is read with the layout expected for this kind of issue.
    pub fn into_entries(self, layout: HtmlLayout, offset: &FixedOffset) -> Vec<WorkLogEntry> {
        match self {
            WorklogResponse::Timesheet(timesheet) => timesheet.into_work_logs(),
            WorklogResponse::Html(html) => layout.scrape(&html, offset),
        }
    }
}
