use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

pub const DEFAULT_USER_AGENT: &str = "jira-burndown";
pub const DEFAULT_COOLDOWN_MS: u64 = 250;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CHART_DAYS: usize = 50;

/// Connection settings for the Jira instance whose work logs are read.
#[derive(Clone, Debug)]
pub struct JiraConfig {
    pub base_url: String,
    pub user_agent: String,
    pub pjax: bool,
    pub cooldown: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub fetch_timeout: Duration,
    pub utc_offset: FixedOffset,
}

impl JiraConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pjax: true,
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            utc_offset: utc(),
        }
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Whether requests carry `X-PJAX: true`, which makes Jira return bare fragments.
    pub fn with_pjax(mut self, enabled: bool) -> Self {
        self.pjax = enabled;
        self
    }

    pub fn with_cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    pub fn with_fetch_timeout(mut self, duration: Duration) -> Self {
        self.fetch_timeout = duration;
        self
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn quick_edit_url(&self, issue_id: &str) -> String {
        format!(
            "{}/secure/QuickEditIssue!default.jspa?issueId={}&decorator=none",
            self.base(),
            issue_id
        )
    }
}

pub(crate) fn utc() -> FixedOffset {
    Utc.fix()
}
