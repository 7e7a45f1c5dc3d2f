// Timeline normalizer - timestamp resolution and long-form reshaping
use crate::domain::dashboard::Notice;
use crate::domain::timeline::{LongRow, SeriesPoint, TableIndex, TimelineTable, Timestamp};
use serde_json::Value;

pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Tried in this order when `timestamp` is absent.
pub const ALTERNATE_TIMESTAMP_COLUMNS: [&str; 3] = ["created_at", "date", "datetime"];

/// Where a table's timestamps came from.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampSource {
    Column,
    Alternate(String),
    Index,
    Unresolved,
}

/// A table with a guaranteed timestamp per row (possibly `NotATime`).
#[derive(Debug, Clone)]
pub struct NormalizedTimeline {
    pub table: TimelineTable,
    pub timestamps: Vec<Timestamp>,
    pub source: TimestampSource,
    pub notices: Vec<Notice>,
}

impl NormalizedTimeline {
    /// Every column except `timestamp`. An alternate source column such as
    /// `created_at` stays a series of its own.
    pub fn value_columns(&self) -> impl Iterator<Item = &str> {
        self.table
            .columns()
            .iter()
            .map(String::as_str)
            .filter(|c| *c != TIMESTAMP_COLUMN)
    }

    pub fn series(&self, column: &str) -> Vec<SeriesPoint> {
        self.timestamps
            .iter()
            .zip(self.table.column_values(column))
            .map(|(ts, value)| SeriesPoint {
                timestamp: *ts,
                value: numeric(value),
            })
            .collect()
    }

    /// Wide to long: one row per (original row, value column), row-major.
    pub fn melt(&self) -> Vec<LongRow> {
        let columns: Vec<&str> = self.value_columns().collect();
        let mut long = Vec::with_capacity(self.table.len() * columns.len());

        for (ts, row) in self.timestamps.iter().zip(self.table.rows()) {
            for column in &columns {
                long.push(LongRow {
                    timestamp: *ts,
                    series: column.to_string(),
                    value: row.get(*column).and_then(numeric),
                });
            }
        }

        long
    }
}

/// Guarantees a timestamp per row, falling back from `timestamp` through the
/// alternate columns and the table index. `label` names the table in notices.
pub fn resolve_timestamps(table: TimelineTable, label: &str) -> NormalizedTimeline {
    let mut notices = Vec::new();

    if table.has_column(TIMESTAMP_COLUMN) {
        let timestamps = parse_column(&table, TIMESTAMP_COLUMN);
        return NormalizedTimeline {
            table,
            timestamps,
            source: TimestampSource::Column,
            notices,
        };
    }

    if let Some(alternate) = ALTERNATE_TIMESTAMP_COLUMNS
        .iter()
        .find(|c| table.has_column(c))
    {
        let message = format!(
            "Column 'timestamp' not found in {}. Using '{}' as timestamp.",
            label, alternate
        );
        tracing::warn!("{}", message);
        notices.push(Notice::Warning(message));

        let timestamps = parse_column(&table, alternate);
        return NormalizedTimeline {
            table,
            timestamps,
            source: TimestampSource::Alternate(alternate.to_string()),
            notices,
        };
    }

    if let Some(timestamps) = index_timestamps(&table) {
        let message = format!(
            "Column 'timestamp' not found in {}. Converting index to timestamp; invalid values are marked as not-a-time.",
            label
        );
        tracing::warn!("{}", message);
        notices.push(Notice::Warning(message));

        return NormalizedTimeline {
            table,
            timestamps,
            source: TimestampSource::Index,
            notices,
        };
    }

    let message = format!(
        "Column 'timestamp' not found in {} and could not be inferred; charts may render empty.",
        label
    );
    tracing::error!("{}", message);
    notices.push(Notice::Error(message));

    NormalizedTimeline {
        timestamps: vec![Timestamp::NotATime; table.len()],
        table,
        source: TimestampSource::Unresolved,
        notices,
    }
}

/// Display-only category key for the usage bar chart: `HH:MM - series`.
pub fn usage_label(row: &LongRow) -> Option<String> {
    row.timestamp
        .hour_minute()
        .map(|hm| format!("{} - {}", hm, row.series))
}

fn parse_column(table: &TimelineTable, column: &str) -> Vec<Timestamp> {
    table.column_values(column).map(Timestamp::parse).collect()
}

/// Labelled indexes are temporal when at least one label parses. Row
/// positions never are: unlike an integer cell, which the API chose to send
/// as a time, a position is only the row's place in the array, and reading
/// it as epoch nanoseconds would put every row in the first microsecond of
/// 1970.
fn index_timestamps(table: &TimelineTable) -> Option<Vec<Timestamp>> {
    match table.index() {
        TableIndex::Positional => None,
        TableIndex::Labels(labels) => {
            let timestamps: Vec<Timestamp> =
                labels.iter().map(|l| Timestamp::parse_str(l)).collect();
            timestamps.iter().any(Timestamp::is_valid).then_some(timestamps)
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> TimelineTable {
        TimelineTable::from_json("test", &value).unwrap()
    }

    #[test]
    fn test_timestamp_column_keeps_invalid_rows() {
        let normalized = resolve_timestamps(
            table(json!([
                {"timestamp": "2024-05-01T10:00:00Z", "requests_count": 5},
                {"timestamp": "garbage", "requests_count": 6},
                {"timestamp": null, "requests_count": 7}
            ])),
            "http_requests_timeline",
        );

        assert_eq!(normalized.source, TimestampSource::Column);
        assert!(normalized.notices.is_empty());
        assert_eq!(normalized.timestamps.len(), 3);
        assert!(normalized.timestamps[0].is_valid());
        assert_eq!(normalized.timestamps[1], Timestamp::NotATime);
        assert_eq!(normalized.timestamps[2], Timestamp::NotATime);

        let points = normalized.series("requests_count");
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].value, Some(7.0));
    }

    #[test]
    fn test_created_at_fallback_warns_once() {
        let normalized = resolve_timestamps(
            table(json!([
                {"created_at": "2024-05-01T10:00:00Z", "date": "2020-01-01", "requests_count": 1},
                {"created_at": "2024-05-01T11:00:00Z", "date": "2020-01-02", "requests_count": 2}
            ])),
            "http_requests_timeline",
        );

        assert_eq!(
            normalized.source,
            TimestampSource::Alternate("created_at".to_string())
        );
        assert_eq!(normalized.notices.len(), 1);
        match &normalized.notices[0] {
            Notice::Warning(message) => {
                assert!(message.contains("'created_at'"));
                assert!(message.contains("http_requests_timeline"));
            }
            other => panic!("expected a warning, got {:?}", other),
        }

        let hours: Vec<String> = normalized
            .timestamps
            .iter()
            .map(|t| t.hour_minute().unwrap())
            .collect();
        assert_eq!(hours, ["10:00", "11:00"]);
        assert_eq!(normalized.series("requests_count")[1].value, Some(2.0));
    }

    #[test]
    fn test_alternates_are_tried_in_order() {
        let normalized = resolve_timestamps(
            table(json!([{"datetime": "2024-05-01T10:00:00Z", "date": "2024-05-02", "cpu": 1}])),
            "system_metrics_timeline",
        );

        assert_eq!(normalized.source, TimestampSource::Alternate("date".to_string()));
        assert_eq!(
            normalized.value_columns().collect::<Vec<_>>(),
            ["datetime", "date", "cpu"]
        );
    }

    #[test]
    fn test_labelled_index_is_used_when_temporal() {
        let normalized = resolve_timestamps(
            table(json!({"p50": {"2024-05-01T10:00:00Z": 12.0, "not a time": 13.0}})),
            "response_times_timeline",
        );

        assert_eq!(normalized.source, TimestampSource::Index);
        assert!(matches!(normalized.notices.as_slice(), [Notice::Warning(_)]));
        assert!(normalized.timestamps[0].is_valid());
        assert_eq!(normalized.timestamps[1], Timestamp::NotATime);
    }

    #[test]
    fn test_unresolvable_timestamps_surface_an_error() {
        let normalized = resolve_timestamps(
            table(json!([{"cpu": 10}, {"cpu": 20}, {"cpu": 30}])),
            "system_metrics_timeline",
        );

        assert_eq!(normalized.source, TimestampSource::Unresolved);
        assert_eq!(normalized.timestamps, vec![Timestamp::NotATime; 3]);
        assert!(matches!(normalized.notices.as_slice(), [Notice::Error(m)] if m.contains("system_metrics_timeline")));
    }

    #[test]
    fn test_non_temporal_labels_are_unresolved() {
        let normalized = resolve_timestamps(
            table(json!({"cpu": {"a": 1, "b": 2}})),
            "system_metrics_timeline",
        );

        assert_eq!(normalized.source, TimestampSource::Unresolved);
        assert_eq!(normalized.table.len(), 2);
    }

    #[test]
    fn test_melt_percentiles() {
        let normalized = resolve_timestamps(
            table(json!([
                {"timestamp": "2024-05-01T10:00:00Z", "p50": 10, "p95": 50, "p99": 90},
                {"timestamp": "2024-05-01T11:00:00Z", "p50": 11, "p95": 51, "p99": 91},
                {"timestamp": "2024-05-01T12:00:00Z", "p50": 12, "p95": "52.5", "p99": null}
            ])),
            "response_times_timeline",
        );

        let long = normalized.melt();
        assert_eq!(long.len(), 9);

        let series: Vec<&str> = long.iter().take(3).map(|r| r.series.as_str()).collect();
        assert_eq!(series, ["p50", "p95", "p99"]);
        assert!(long[..3].iter().all(|r| r.timestamp == normalized.timestamps[0]));
        assert_eq!(long[7].value, Some(52.5));
        assert_eq!(long[8].value, None);
        assert_eq!(long.iter().filter(|r| r.series == "p95").count(), 3);
    }

    #[test]
    fn test_melt_keeps_alternate_column_as_series() {
        let normalized = resolve_timestamps(
            table(json!([
                {"created_at": "2024-05-01T10:00:00Z", "p50": 10, "p95": 50, "p99": 90},
                {"created_at": "2024-05-01T11:00:00Z", "p50": 11, "p95": 51, "p99": 91}
            ])),
            "response_times_timeline",
        );

        let long = normalized.melt();
        assert_eq!(long.len(), 8);

        let series: Vec<&str> = long.iter().map(|r| r.series.as_str()).collect();
        assert_eq!(
            series,
            ["created_at", "p50", "p95", "p99", "created_at", "p50", "p95", "p99"]
        );
        assert_eq!(long[0].value, None);
        assert_eq!(long[5].value, Some(11.0));
        assert_eq!(long[4].timestamp, normalized.timestamps[1]);
    }

    #[test]
    fn test_usage_label_follows_resolved_timestamp() {
        let normalized = resolve_timestamps(
            table(json!([{"created_at": "2024-05-01T10:00:00Z", "cpu": 40, "memory": 70}])),
            "system_metrics_timeline",
        );

        let long = normalized.melt();
        assert_eq!(long.len(), 3);
        assert_eq!(usage_label(&long[1]).as_deref(), Some("10:00 - cpu"));
        assert_eq!(usage_label(&long[2]).as_deref(), Some("10:00 - memory"));
    }

    #[test]
    fn test_usage_label_absent_for_invalid_timestamp() {
        let row = LongRow {
            timestamp: Timestamp::NotATime,
            series: "cpu".to_string(),
            value: Some(1.0),
        };
        assert_eq!(usage_label(&row), None);
    }
}
