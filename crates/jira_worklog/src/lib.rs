//! Work-log aggregation for Jira issues: fetch, normalize and chart remaining effort.

pub mod aggregator;
pub mod burndown;
pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod pacer;
pub mod response;
pub mod scrape;
pub mod template;

pub use aggregator::{
    BurndownReport, BurndownRequest, CollectedLogs, SubtaskFailure, SubtaskLogs, WorklogAggregator,
};
pub use burndown::{
    build_burndown_series, build_burndown_series_with, BurnDownSeries, BurndownOptions,
    BurndownOutcome, DailyBucket,
};
pub use client::JiraClient;
pub use config::JiraConfig;
pub use duration::{format_time_budget, parse_time_budget, TimeBudget};
pub use error::{Result, WorklogError};
pub use fetcher::WorklogFetcher;
pub use models::{QuickEditIssue, TimeTracking, WorkLogEntry};
pub use response::{RawResponse, WorklogResponse};
pub use template::{WorklogSource, WorklogUrlTemplate};
