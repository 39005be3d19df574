//! Fetches work logs for an issue and its sub-tasks and turns them into a burn-down.

use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::burndown::{build_burndown_series_with, BurndownOptions, BurndownOutcome};
use crate::config::{JiraConfig, DEFAULT_FETCH_TIMEOUT_SECS};
use crate::error::{Result, WorklogError};
use crate::fetcher::WorklogFetcher;
use crate::models::{TimeTracking, WorkLogEntry};
use crate::response::{RawResponse, WorklogResponse};
use crate::scrape::HtmlLayout;
use crate::template::WorklogUrlTemplate;

/// A sub-task whose work logs could not be fetched; the chain carried on without it.
#[derive(Debug)]
pub struct SubtaskFailure {
    pub subtask_id: String,
    pub error: WorklogError,
}

#[derive(Debug, Default)]
pub struct SubtaskLogs {
    pub entries: Vec<WorkLogEntry>,
    pub failures: Vec<SubtaskFailure>,
}

#[derive(Debug, Default)]
pub struct CollectedLogs {
    pub root: Vec<WorkLogEntry>,
    pub subtasks: Vec<WorkLogEntry>,
    pub failures: Vec<SubtaskFailure>,
}

impl CollectedLogs {
    pub fn entry_count(&self) -> usize {
        self.root.len() + self.subtasks.len()
    }
}

/// Everything needed to chart one issue.
#[derive(Debug, Clone)]
pub struct BurndownRequest {
    pub template: WorklogUrlTemplate,
    pub issue_id: String,
    pub issue_key: String,
    pub subtask_ids: Vec<String>,
    pub tracking: TimeTracking,
    pub due_date: NaiveDate,
}

#[derive(Debug)]
pub struct BurndownReport {
    pub outcome: BurndownOutcome,
    pub total_estimate: i64,
    pub entry_count: usize,
    pub failures: Vec<SubtaskFailure>,
}

/// Stateless between invocations: each call fetches, merges and computes from scratch.
pub struct WorklogAggregator<F> {
    fetcher: F,
    fetch_timeout: Duration,
    options: BurndownOptions,
}

impl<F: WorklogFetcher> WorklogAggregator<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            options: BurndownOptions::default(),
        }
    }

    /// Takes the per-fetch timeout and calendar offset from a client configuration.
    pub fn from_config(fetcher: F, config: &JiraConfig) -> Self {
        Self::new(fetcher)
            .with_fetch_timeout(config.fetch_timeout)
            .with_options(BurndownOptions {
                utc_offset: config.utc_offset,
                ..BurndownOptions::default()
            })
    }

    pub fn with_fetch_timeout(mut self, duration: Duration) -> Self {
        self.fetch_timeout = duration;
        self
    }

    pub fn with_options(mut self, options: BurndownOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BurndownOptions {
        &self.options
    }

    async fn fetch_with_timeout(&self, url: &str) -> Result<RawResponse> {
        match timeout(self.fetch_timeout, self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(WorklogError::Timeout(format!(
                "{} after {}ms",
                url,
                self.fetch_timeout.as_millis()
            ))),
        }
    }

    /// Work logs recorded directly on the parent issue. A failure here aborts the burn-down.
    pub async fn fetch_issue_logs(
        &self,
        template: &WorklogUrlTemplate,
        issue_id: &str,
        issue_key: &str,
    ) -> Result<Vec<WorkLogEntry>> {
        let url = template.render(issue_id, issue_key);
        let raw = self.fetch_with_timeout(&url).await?;
        let entries = WorklogResponse::classify(raw)?
            .into_entries(HtmlLayout::IssueTab, &self.options.utc_offset);
        debug!(issue = issue_key, entries = entries.len(), "Fetched issue worklogs");
        Ok(entries)
    }

    /// Fetches sub-task logs one after another from `start_index`, appending to `accumulated`.
    ///
    /// Each request starts only once the previous response has been merged. A failed or
    /// timed-out sub-task is recorded in `failures` and skipped.
    pub async fn fetch_subtask_logs(
        &self,
        template: &WorklogUrlTemplate,
        subtask_ids: &[String],
        start_index: usize,
        accumulated: Vec<WorkLogEntry>,
    ) -> SubtaskLogs {
        let mut logs = SubtaskLogs {
            entries: accumulated,
            failures: Vec::new(),
        };

        for subtask_id in subtask_ids.iter().skip(start_index) {
            let subtask_id = subtask_id.trim();
            if subtask_id.is_empty() {
                debug!("Skipping blank sub-task id");
                continue;
            }

            // Sub-task links only expose one identifier, so it fills both placeholders.
            let url = template.render(subtask_id, subtask_id);
            let response = self
                .fetch_with_timeout(&url)
                .await
                .and_then(WorklogResponse::classify);
            match response {
                Ok(response) => {
                    let entries = response
                        .into_entries(HtmlLayout::SubtaskPanel, &self.options.utc_offset);
                    debug!(subtask = subtask_id, entries = entries.len(), "Fetched sub-task worklogs");
                    logs.entries.extend(entries);
                }
                Err(error) => {
                    warn!(subtask = subtask_id, %error, "Skipping sub-task worklogs");
                    logs.failures.push(SubtaskFailure {
                        subtask_id: subtask_id.to_string(),
                        error,
                    });
                }
            }
        }

        logs
    }

    pub async fn collect(
        &self,
        template: &WorklogUrlTemplate,
        issue_id: &str,
        issue_key: &str,
        subtask_ids: &[String],
    ) -> Result<CollectedLogs> {
        let root = self.fetch_issue_logs(template, issue_id, issue_key).await?;
        let subtasks = self
            .fetch_subtask_logs(template, subtask_ids, 0, Vec::new())
            .await;
        Ok(CollectedLogs {
            root,
            subtasks: subtasks.entries,
            failures: subtasks.failures,
        })
    }

    pub async fn burndown(&self, request: &BurndownRequest) -> Result<BurndownReport> {
        let collected = self
            .collect(
                &request.template,
                &request.issue_id,
                &request.issue_key,
                &request.subtask_ids,
            )
            .await?;

        let entry_count = collected.entry_count();
        let total_estimate = request.tracking.total_estimate();
        let outcome = build_burndown_series_with(
            &self.options,
            collected.root,
            collected.subtasks,
            total_estimate,
            request.due_date,
        );
        info!(
            issue = %request.issue_key,
            entries = entry_count,
            skipped_subtasks = collected.failures.len(),
            "Burn-down computed"
        );

        Ok(BurndownReport {
            outcome,
            total_estimate,
            entry_count,
            failures: collected.failures,
        })
    }
}
