//! Jira-style time budget text (`1w 2d 3h 4m`) parsing and formatting.

use once_cell::sync::Lazy;
use regex::Regex;

pub const WORKDAYS_PER_WEEK: i64 = 5;
pub const WORKDAY_HOURS: i64 = 8;
pub const SECONDS_PER_HOUR: i64 = 3600;
pub const SECONDS_PER_MINUTE: i64 = 60;

const SECONDS_PER_DAY: i64 = WORKDAY_HOURS * SECONDS_PER_HOUR;
const SECONDS_PER_WEEK: i64 = WORKDAYS_PER_WEEK * SECONDS_PER_DAY;

// Every unit is optional, so the pattern always matches at offset 0 and text
// that does not start with a unit token yields an empty budget.
static TIME_BUDGET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(\d+\.?\d*?)w)?\s?(?:(\d+\.?\d*?)d)?\s?(?:(\d+\.?\d*?)h)?\s?(?:(\d+\.?\d*?)m)?\s?",
    )
    .expect("invalid time budget regex")
});

/// Parsed duration split into working weeks, working days, hours and minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeBudget {
    pub weeks: f64,
    pub days: f64,
    pub hours: f64,
    pub minutes: f64,
}

impl TimeBudget {
    /// Extracts the first budget match from free-form text; missing units are zero.
    pub fn parse(text: &str) -> Self {
        let Some(captures) = TIME_BUDGET_REGEX.captures(text) else {
            return Self::default();
        };
        let unit = |index: usize| {
            captures
                .get(index)
                .and_then(|value| value.as_str().parse::<f64>().ok())
                .unwrap_or(0.0)
        };
        Self {
            weeks: unit(1),
            days: unit(2),
            hours: unit(3),
            minutes: unit(4),
        }
    }

    /// Total length in seconds, rounded to the nearest whole second.
    pub fn as_seconds(&self) -> i64 {
        let total = self.weeks * SECONDS_PER_WEEK as f64
            + self.days * SECONDS_PER_DAY as f64
            + self.hours * SECONDS_PER_HOUR as f64
            + self.minutes * SECONDS_PER_MINUTE as f64;
        total.round() as i64
    }

    pub fn is_zero(&self) -> bool {
        self.as_seconds() == 0
    }
}

/// Parses budget text into seconds. Text without a leading budget yields 0.
pub fn parse_time_budget(text: &str) -> i64 {
    TimeBudget::parse(text).as_seconds()
}

/// Formats seconds back into `1w 2d 3h 4m` form using working-time units.
pub fn format_time_budget(seconds: i64) -> String {
    if seconds == 0 {
        return "0m".to_string();
    }

    let sign = if seconds < 0 { "-" } else { "" };
    let mut rest = seconds.abs();
    let mut parts = Vec::new();
    for (size, suffix) in [
        (SECONDS_PER_WEEK, "w"),
        (SECONDS_PER_DAY, "d"),
        (SECONDS_PER_HOUR, "h"),
        (SECONDS_PER_MINUTE, "m"),
    ] {
        let count = rest / size;
        if count > 0 {
            parts.push(format!("{}{}", count, suffix));
            rest -= count * size;
        }
    }

    if parts.is_empty() {
        // Under a minute.
        return format!("{}0m", sign);
    }
    format!("{}{}", sign, parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_units_sum_with_working_time_constants() {
        assert_eq!(
            parse_time_budget("1w 2d 3h 4m"),
            5 * 8 * 3600 + 2 * 8 * 3600 + 3 * 3600 + 4 * 60
        );
    }

    #[test]
    fn empty_and_garbage_text_is_zero() {
        assert_eq!(parse_time_budget(""), 0);
        assert_eq!(parse_time_budget("garbage"), 0);
        assert_eq!(parse_time_budget("none logged"), 0);
    }

    #[test]
    fn units_may_be_sparse_and_fractional() {
        assert_eq!(parse_time_budget("2h"), 7200);
        assert_eq!(parse_time_budget("1d 30m"), 8 * 3600 + 1800);
        assert_eq!(parse_time_budget("1.5h"), 5400);
        assert_eq!(parse_time_budget("3w"), 3 * 5 * 8 * 3600);
    }

    #[test]
    fn only_the_leading_match_counts() {
        // A budget that appears after other text is not picked up.
        assert_eq!(parse_time_budget("took 3h"), 0);
        assert_eq!(parse_time_budget("2h (estimate 5h)"), 7200);
    }

    #[test]
    fn units_out_of_order_stop_the_match() {
        // `m` before `h` ends the match after the minutes.
        assert_eq!(parse_time_budget("4m 3h"), 240);
    }

    #[test]
    fn parse_exposes_each_unit() {
        let budget = TimeBudget::parse("1w 2d 3h 4m");
        assert_eq!(budget.weeks, 1.0);
        assert_eq!(budget.days, 2.0);
        assert_eq!(budget.hours, 3.0);
        assert_eq!(budget.minutes, 4.0);
        assert!(TimeBudget::parse("n/a").is_zero());
    }

    #[test]
    fn format_round_trips_whole_units() {
        assert_eq!(format_time_budget(0), "0m");
        assert_eq!(format_time_budget(7200), "2h");
        assert_eq!(format_time_budget(212_640), "1w 2d 3h 4m");
        assert_eq!(format_time_budget(-5400), "-1h 30m");
        assert_eq!(format_time_budget(30), "0m");
    }
}
