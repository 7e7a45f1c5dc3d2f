// Monitoring payload domain models
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::PayloadError;
use super::timeline::{TimelineTable, record};

pub const CURRENT_METRICS: &str = "current_metrics";
pub const HISTORICAL_DATA: &str = "historical_data";
pub const REQUESTS_TIMELINE: &str = "http_requests_timeline";
pub const RESPONSE_TIMES_TIMELINE: &str = "response_times_timeline";
pub const SYSTEM_METRICS_TIMELINE: &str = "system_metrics_timeline";
pub const ERROR_EVENTS: &str = "error_events";

/// Snapshot KPIs. Rates are fractions in [0, 1]; durations are milliseconds.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CurrentMetrics {
    pub total_requests: i64,
    pub success_rate: f64,
    pub avg_response_time: f64,
    pub active_users: i64,
    pub error_rate_5xx: f64,
    pub error_rate_4xx: f64,
    pub failed_logins_rate: f64,
    pub current_timestamp: String,
    pub data_source: String,
}

/// A timeline whose shape cannot be used stays an `Err` so only its own
/// section is affected.
#[derive(Debug)]
pub struct HistoricalData {
    pub requests: Result<TimelineTable, PayloadError>,
    pub response_times: Result<TimelineTable, PayloadError>,
    pub system_metrics: Result<TimelineTable, PayloadError>,
    pub error_events: Vec<Map<String, Value>>,
}

#[derive(Debug)]
pub struct DashboardPayload {
    pub current_metrics: CurrentMetrics,
    pub historical_data: HistoricalData,
}

impl DashboardPayload {
    pub fn from_json(value: Value) -> Result<Self, PayloadError> {
        let current = section(&value, CURRENT_METRICS)?;
        let current_metrics =
            CurrentMetrics::deserialize(current).map_err(PayloadError::Metrics)?;

        let history = section(&value, HISTORICAL_DATA)?;
        let historical_data = HistoricalData {
            requests: timeline(history, REQUESTS_TIMELINE)?,
            response_times: timeline(history, RESPONSE_TIMES_TIMELINE)?,
            system_metrics: timeline(history, SYSTEM_METRICS_TIMELINE)?,
            error_events: error_events(section(history, ERROR_EVENTS)?)?,
        };

        Ok(Self {
            current_metrics,
            historical_data,
        })
    }
}

fn section<'a>(value: &'a Value, key: &str) -> Result<&'a Value, PayloadError> {
    value
        .get(key)
        .ok_or_else(|| PayloadError::MissingSection(key.to_string()))
}

fn timeline(
    history: &Value,
    key: &str,
) -> Result<Result<TimelineTable, PayloadError>, PayloadError> {
    Ok(TimelineTable::from_json(key, section(history, key)?))
}

/// Events are shown as-is; scalar entries land in a single `0` column.
fn error_events(value: &Value) -> Result<Vec<Map<String, Value>>, PayloadError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.iter().map(record).collect()),
        other => Err(PayloadError::InvalidTable {
            name: ERROR_EVENTS.to_string(),
            reason: format!("expected an array, got {}", other),
        }),
    }
}
