//! Renderer-facing payloads built from a computed burn-down.
//!
//! The chart payload mirrors a two-dataset line chart: the actual remaining
//! effort in red and the reference line in green, both spanning gaps.

use clap::ValueEnum;
use jira_worklog::{format_time_budget, BurnDownSeries};
use serde::Serialize;

const ACTUAL_COLOR: &str = "red";
const REFERENCE_COLOR: &str = "green";

/// Unit the plotted values are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueUnit {
    Seconds,
    Minutes,
    Hours,
}

impl ValueUnit {
    pub fn convert(self, seconds: i64) -> f64 {
        match self {
            ValueUnit::Seconds => seconds as f64,
            ValueUnit::Minutes => seconds as f64 / 60.0,
            ValueUnit::Hours => seconds as f64 / 3600.0,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChartPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub border_color: String,
    pub fill: bool,
    pub line_tension: f64,
    pub span_gaps: bool,
    pub stepped_line: bool,
}

impl ChartDataset {
    fn line(label: &str, color: &str, values: &[Option<i64>], unit: ValueUnit) -> Self {
        Self {
            label: label.to_string(),
            data: values
                .iter()
                .map(|value| value.map(|seconds| unit.convert(seconds)))
                .collect(),
            border_color: color.to_string(),
            fill: false,
            line_tension: 0.0,
            span_gaps: true,
            stepped_line: false,
        }
    }
}

impl ChartPayload {
    pub fn from_series(series: &BurnDownSeries, unit: ValueUnit) -> Self {
        Self {
            kind: "line".to_string(),
            labels: series.days.clone(),
            datasets: vec![
                ChartDataset::line("Remaining", ACTUAL_COLOR, &series.actual_line, unit),
                ChartDataset::line("Reference", REFERENCE_COLOR, &series.reference_line, unit),
            ],
        }
    }
}

/// Plain-text table: one row per business day, blanks where a line has a gap.
pub fn render_table(series: &BurnDownSeries) -> String {
    let cell = |value: &Option<i64>| value.map(format_time_budget).unwrap_or_default();
    let mut out = format!("{:<10}{:>14}{:>14}\n", "Day", "Remaining", "Reference");
    for ((day, actual), reference) in series
        .days
        .iter()
        .zip(&series.actual_line)
        .zip(&series.reference_line)
    {
        out.push_str(&format!("{:<10}{:>14}{:>14}\n", day, cell(actual), cell(reference)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn series() -> BurnDownSeries {
        BurnDownSeries {
            days: vec!["Oct, 14".into(), "Oct, 15".into(), "Oct, 16".into()],
            reference_line: vec![Some(28800), None, Some(0)],
            actual_line: vec![Some(21600), None, Some(7200)],
        }
    }

    #[test]
    fn payload_keeps_gaps_as_null() {
        let payload = ChartPayload::from_series(&series(), ValueUnit::Hours);
        let value = serde_json::to_value(&payload).expect("payload should encode");

        assert_eq!(value["type"], "line");
        assert_eq!(value["labels"], json!(["Oct, 14", "Oct, 15", "Oct, 16"]));
        assert_eq!(value["datasets"][0]["data"], json!([6.0, null, 2.0]));
        assert_eq!(value["datasets"][0]["borderColor"], "red");
        assert_eq!(value["datasets"][1]["data"], json!([8.0, null, 0.0]));
        assert_eq!(value["datasets"][1]["spanGaps"], true);
        assert_eq!(value["datasets"][1]["fill"], false);
    }

    #[test]
    fn units_convert_from_seconds() {
        assert_eq!(ValueUnit::Seconds.convert(90), 90.0);
        assert_eq!(ValueUnit::Minutes.convert(90), 1.5);
        assert_eq!(ValueUnit::Hours.convert(5400), 1.5);
    }

    #[test]
    fn table_lists_each_day() {
        let table = render_table(&series());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("Oct, 14"));
        assert!(lines[1].contains("6h"));
        assert!(lines[1].contains("1d"));
        assert_eq!(lines[2].trim(), "Oct, 15");
        assert!(lines[3].trim_end().ends_with("0m"));
    }
}
