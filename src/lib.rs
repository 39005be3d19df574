use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use jira_worklog::models::parse_short_date;
use jira_worklog::{
    BurndownOutcome, BurndownRequest, JiraClient, QuickEditIssue, TimeTracking, WorklogAggregator,
    WorklogUrlTemplate,
};
use log::{debug, info, warn};

pub mod chart;
pub mod config;

use chart::{render_table, ChartPayload, ValueUnit};
use config::{Config, ConfigManager, WorklogSourceSetting};

const ISSUE_TAB_QUERY: &str = "?page=com.atlassian.jira.plugin.system.issuetabpanels:worklog-tabpanel";
pub const NO_WORKLOG_MESSAGE: &str = "No worklog available";
pub const MISSING_DUE_DATE_MESSAGE: &str =
    "It's not possible to render a burndown without a due date";
pub const NO_BUSINESS_DAYS_MESSAGE: &str =
    "No working days between the first worklog and the due date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Line-chart payload as JSON.
    Chart,
    /// Raw series as JSON.
    Series,
    /// Human-readable table.
    Table,
}

/// Draws a burn-down for a Jira issue from the work logged on it and its sub-tasks.
#[derive(Parser, Debug)]
#[command(name = "jira-burndown", version, about)]
pub struct Cli {
    /// Jira base URL; overrides the configured one.
    #[arg(long)]
    pub base_url: Option<String>,
    /// Numeric issue id.
    #[arg(long)]
    pub issue_id: String,
    /// Issue key, e.g. QUAL-123.
    #[arg(long)]
    pub issue_key: String,
    /// Sub-task identifier; repeat for each sub-task, in display order.
    #[arg(long = "subtask")]
    pub subtasks: Vec<String>,
    /// Href of the issue page's "Work Log" tab, used to pick the worklog endpoint.
    #[arg(long)]
    pub worklog_href: Option<String>,
    /// Due date as YYYY-MM-DD or dd/Mon/yy; read from the issue when omitted.
    #[arg(long)]
    pub due_date: Option<String>,
    /// Remaining estimate text, e.g. "2d 4h". With neither this nor --logged the original estimate is the total.
    #[arg(long, default_value = "")]
    pub remaining: String,
    /// Time logged text, e.g. "1d 2h".
    #[arg(long, default_value = "")]
    pub logged: String,
    /// Original estimate text; read from the issue when omitted and nothing is tracked.
    #[arg(long)]
    pub original_estimate: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Chart)]
    pub format: OutputFormat,
    #[arg(long, value_enum, default_value_t = ValueUnit::Hours)]
    pub unit: ValueUnit,
}

/// Accepts ISO dates as well as Jira's short `dd/Mon/yy` form.
pub fn parse_due_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_short_date(text))
}

/// Chooses the worklog URL template: an explicit tab href wins over the configured source.
pub fn resolve_template(
    base_url: &str,
    worklog_href: Option<&str>,
    source: WorklogSourceSetting,
) -> Result<WorklogUrlTemplate, String> {
    if let Some(href) = worklog_href {
        return WorklogUrlTemplate::from_tab_href(base_url, href).map_err(|err| err.to_string());
    }
    match source {
        WorklogSourceSetting::Timesheet => Ok(WorklogUrlTemplate::timesheet(base_url)),
        WorklogSourceSetting::IssueTab => {
            let href = format!("/browse/{{1}}{}", ISSUE_TAB_QUERY);
            WorklogUrlTemplate::from_tab_href(base_url, &href).map_err(|err| err.to_string())
        }
    }
}

/// Formats an outcome for stdout.
pub fn render_outcome(
    outcome: &BurndownOutcome,
    format: OutputFormat,
    unit: ValueUnit,
) -> Result<String, String> {
    let Some(series) = outcome.series() else {
        return Ok(NO_WORKLOG_MESSAGE.to_string());
    };
    if series.is_empty() {
        return Ok(NO_BUSINESS_DAYS_MESSAGE.to_string());
    }
    match format {
        OutputFormat::Chart => serde_json::to_string_pretty(&ChartPayload::from_series(series, unit))
            .map_err(|err| err.to_string()),
        OutputFormat::Series => serde_json::to_string_pretty(series).map_err(|err| err.to_string()),
        OutputFormat::Table => Ok(render_table(series)),
    }
}

async fn fetch_issue_metadata(client: &JiraClient, issue_id: &str) -> Option<QuickEditIssue> {
    match client.get_quick_edit_issue(issue_id).await {
        Ok(issue) => Some(issue),
        Err(err) => {
            warn!("Failed to read issue fields for {}", issue_id);
            debug!("Issue field fetch details: {}", err);
            None
        }
    }
}

/// Runs one burn-down and returns what should be printed.
pub async fn execute(cli: &Cli, config: &Config) -> Result<String, String> {
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| config.base_url.clone())
        .ok_or_else(|| "No Jira base URL configured; pass --base-url".to_string())?;

    let jira_config = config.jira_config(&base_url);
    let client = JiraClient::new(jira_config.clone()).map_err(|err| err.to_string())?;
    let template = resolve_template(&base_url, cli.worklog_href.as_deref(), config.worklog_source)?;
    debug!("Using worklog template {}", template.as_str());

    let explicit_due = match cli.due_date.as_deref() {
        Some(text) => Some(
            parse_due_date(text).ok_or_else(|| format!("Unrecognised due date: {}", text))?,
        ),
        None => None,
    };
    let mut tracking =
        TimeTracking::from_texts(cli.original_estimate.as_deref(), &cli.remaining, &cli.logged);
    // Issue fields are only worth a request when they fill something still missing.
    let metadata = if explicit_due.is_none() || tracking.needs_original_estimate() {
        fetch_issue_metadata(&client, &cli.issue_id).await
    } else {
        None
    };

    let Some(due_date) = explicit_due.or_else(|| metadata.as_ref().and_then(QuickEditIssue::due_date))
    else {
        return Ok(MISSING_DUE_DATE_MESSAGE.to_string());
    };

    if tracking.needs_original_estimate() {
        if let Some(seconds) = metadata.as_ref().and_then(QuickEditIssue::original_estimate) {
            tracking = tracking.with_original_estimate(seconds);
        }
    }
    if tracking.total_estimate() == 0 {
        warn!(
            "No estimate known for {}; pass --remaining/--logged or --original-estimate",
            cli.issue_key
        );
    }

    let request = BurndownRequest {
        template,
        issue_id: cli.issue_id.clone(),
        issue_key: cli.issue_key.clone(),
        subtask_ids: cli.subtasks.clone(),
        tracking,
        due_date,
    };
    let aggregator = WorklogAggregator::from_config(client, &jira_config)
        .with_options(config.burndown_options());
    let report = aggregator
        .burndown(&request)
        .await
        .map_err(|err| err.to_string())?;

    for failure in &report.failures {
        warn!(
            "Sub-task {} left out of the burn-down: {}",
            failure.subtask_id, failure.error
        );
    }
    info!(
        "Burn-down for {} built from {} worklog entries",
        cli.issue_key, report.entry_count
    );

    render_outcome(&report.outcome, cli.format, cli.unit)
}

/// Process entry point: logging, config, a single-threaded runtime, one burn-down.
pub fn run() -> i32 {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();

    let cli = Cli::parse();
    let config = match ConfigManager::new() {
        Ok(manager) => manager.load(),
        Err(err) => {
            warn!("Using default config: {}", err);
            Config::default()
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to start runtime: {}", err);
            return 1;
        }
    };

    match runtime.block_on(execute(&cli, &config)) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(err) => {
            eprintln!("{}", err);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use jira_worklog::scrape::HtmlLayout;
    use jira_worklog::{BurnDownSeries, WorklogSource};
    use std::sync::Mutex;

    static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct CapturingLogger;

    impl log::Log for CapturingLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            CAPTURED
                .lock()
                .unwrap()
                .push(format!("{} {}", record.level(), record.args()));
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger;

    #[test]
    fn due_dates_in_both_formats() {
        assert_eq!(parse_due_date("2019-10-18"), NaiveDate::from_ymd_opt(2019, 10, 18));
        assert_eq!(parse_due_date(" 18/Oct/19 "), NaiveDate::from_ymd_opt(2019, 10, 18));
        assert_eq!(parse_due_date("next friday"), None);
    }

    #[test]
    fn configured_issue_tab_template_uses_key() {
        let template =
            resolve_template("https://jira.example.com", None, WorklogSourceSetting::IssueTab)
                .expect("template should build");
        assert_eq!(template.source(), WorklogSource::IssueTab);
        assert_eq!(
            template.render("10042", "QUAL-7"),
            format!("https://jira.example.com/browse/QUAL-7{}", ISSUE_TAB_QUERY)
        );
    }

    #[test]
    fn tab_href_overrides_configured_source() {
        let template = resolve_template(
            "https://jira.example.com",
            Some("/browse/QUAL-7?page=com.deniz.jira.worklog:worklog-tabpanel"),
            WorklogSourceSetting::IssueTab,
        )
        .expect("template should build");
        assert_eq!(template.source(), WorklogSource::Timesheet);

        let template =
            resolve_template("https://jira.example.com", None, WorklogSourceSetting::Timesheet)
                .expect("template should build");
        assert!(template.render("10042", "QUAL-7").ends_with("targetKey=10042"));
    }

    #[test]
    fn no_data_outcome_prints_message() {
        let output = render_outcome(&BurndownOutcome::NoWorkLogData, OutputFormat::Chart, ValueUnit::Hours)
            .expect("render should succeed");
        assert_eq!(output, NO_WORKLOG_MESSAGE);
    }

    #[test]
    fn series_outcome_renders_in_each_format() {
        let outcome = BurndownOutcome::Series(BurnDownSeries {
            days: vec!["Oct, 14".into(), "Oct, 15".into()],
            reference_line: vec![Some(3600), Some(0)],
            actual_line: vec![Some(1800), None],
        });

        let chart = render_outcome(&outcome, OutputFormat::Chart, ValueUnit::Minutes).unwrap();
        let chart: serde_json::Value = serde_json::from_str(&chart).unwrap();
        assert_eq!(chart["datasets"][0]["data"], serde_json::json!([30.0, null]));

        let series = render_outcome(&outcome, OutputFormat::Series, ValueUnit::Hours).unwrap();
        let series: serde_json::Value = serde_json::from_str(&series).unwrap();
        assert_eq!(series["referenceLine"], serde_json::json!([3600, 0]));

        let table = render_outcome(&outcome, OutputFormat::Table, ValueUnit::Hours).unwrap();
        assert!(table.contains("Oct, 15"));
    }

    #[test]
    fn cli_accepts_repeated_subtasks() {
        let cli = Cli::parse_from([
            "jira-burndown",
            "--issue-id",
            "10042",
            "--issue-key",
            "QUAL-7",
            "--subtask",
            "QUAL-8",
            "--subtask",
            "QUAL-9",
            "--remaining",
            "1d",
            "--format",
            "table",
        ]);
        assert_eq!(cli.subtasks, vec!["QUAL-8", "QUAL-9"]);
        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.unit, ValueUnit::Hours);
        assert_eq!(cli.logged, "");
    }

    #[tokio::test]
    async fn missing_base_url_is_an_error() {
        let cli = Cli::parse_from(["jira-burndown", "--issue-id", "1", "--issue-key", "A-1"]);
        let err = execute(&cli, &Config::default()).await.unwrap_err();
        assert!(err.contains("--base-url"));
    }

    #[test]
    fn empty_series_prints_message() {
        let outcome = BurndownOutcome::Series(BurnDownSeries {
            days: Vec::new(),
            reference_line: Vec::new(),
            actual_line: Vec::new(),
        });
        let output = render_outcome(&outcome, OutputFormat::Chart, ValueUnit::Hours)
            .expect("render should succeed");
        assert_eq!(output, NO_BUSINESS_DAYS_MESSAGE);
    }

    #[test]
    fn library_warnings_reach_the_log_facade() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);

        let utc = FixedOffset::east_opt(0).unwrap();
        let entries =
            HtmlLayout::SubtaskPanel.scrape("<td class=\"worklog-duration\">2h</td>\n", &utc);
        assert!(entries.is_empty());

        let captured = CAPTURED.lock().unwrap();
        assert!(captured
            .iter()
            .any(|line| line.starts_with("WARN") && line.contains("without a Created marker")));
    }

    #[tokio::test]
    async fn explicit_due_date_and_tracking_skip_issue_metadata() {
        let mut server = mockito::Server::new_async().await;
        let quick_edit = server
            .mock("GET", mockito::Matcher::Regex("QuickEditIssue".into()))
            .expect(0)
            .create_async()
            .await;
        let worklogs = server
            .mock("GET", "/browse/QUAL-7")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<div>No work has yet been logged</div>")
            .create_async()
            .await;

        let cli = Cli::parse_from([
            "jira-burndown",
            "--base-url",
            &server.url(),
            "--issue-id",
            "10042",
            "--issue-key",
            "QUAL-7",
            "--due-date",
            "2019-10-18",
            "--remaining",
            "1d",
        ]);
        let config = Config {
            request_cooldown_ms: 0,
            ..Config::default()
        };

        let output = execute(&cli, &config).await.expect("run should succeed");
        assert_eq!(output, NO_WORKLOG_MESSAGE);
        quick_edit.assert_async().await;
        worklogs.assert_async().await;
    }
}
