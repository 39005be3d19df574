//! Payload returned by the worklog-timesheet plugin endpoint.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::WorkLogEntry;
use crate::error::Result;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetResponse {
    #[serde(default)]
    pub projects: Vec<TimesheetProject>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetProject {
    #[serde(default)]
    pub issues: Vec<TimesheetIssue>,
}

/// Records stay undecoded here so one malformed record cannot sink its siblings.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetIssue {
    #[serde(default)]
    pub work_logs: Vec<Value>,
}

impl TimesheetResponse {
    /// Whether the payload carries `projects[0].issues[0]`.
    pub fn matches(value: &Value) -> bool {
        value
            .get("projects")
            .and_then(|projects| projects.get(0))
            .and_then(|project| project.get("issues"))
            .and_then(|issues| issues.get(0))
            .is_some()
    }

    /// Decodes a payload that [`matches`](Self::matches); a broken envelope is a serialization error.
    pub fn decode(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Work logs of the first issue of the first project, which is the issue that was asked for.
    ///
    /// Records that do not decode are logged and left out.
    pub fn into_work_logs(self) -> Vec<WorkLogEntry> {
        let records = self
            .projects
            .into_iter()
            .next()
            .and_then(|project| project.issues.into_iter().next())
            .map(|issue| issue.work_logs)
            .unwrap_or_default();

        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(index, error = %err, "Skipping unreadable timesheet record");
                    None
                }
            })
            .collect()
    }
}
