use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded time-tracking event: when the work started and how many seconds were spent.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogEntry {
    #[serde(
        deserialize_with = "deserialize_epoch_millis",
        serialize_with = "chrono::serde::ts_milliseconds::serialize"
    )]
    pub work_start: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub time_spent: i64,
}

impl WorkLogEntry {
    pub fn new(work_start: DateTime<Utc>, time_spent: i64) -> Self {
        Self {
            work_start,
            time_spent,
        }
    }

    /// Calendar date of `work_start` as seen from the given offset.
    pub fn calendar_day(&self, offset: &FixedOffset) -> NaiveDate {
        self.work_start.with_timezone(offset).date_naive()
    }
}

fn numeric_value<E: DeError>(value: Value, field: &str) -> Result<f64, E> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| E::custom(format!("{field} is out of range"))),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| E::custom(format!("{field} is not numeric: {text}"))),
        other => Err(E::custom(format!("{field} has unexpected type: {other}"))),
    }
}

fn deserialize_epoch_millis<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = numeric_value::<D::Error>(Value::deserialize(deserializer)?, "workStart")?;
    Utc.timestamp_millis_opt(millis.round() as i64)
        .single()
        .ok_or_else(|| D::Error::custom(format!("workStart out of range: {millis}")))
}

fn deserialize_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(value) => Ok(numeric_value::<D::Error>(value, "timeSpent")?.round() as i64),
    }
}
