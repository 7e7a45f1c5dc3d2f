// Timeline domain models - raw tables as delivered by the monitoring API
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};

use super::error::PayloadError;

static NULL: Value = Value::Null;

const OFFSET_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A parsed point in time, or the "not-a-time" marker for values that could
/// not be interpreted. Rows carrying `NotATime` are kept, never dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    At(DateTime<Utc>),
    NotATime,
}

impl Timestamp {
    /// Coercing parse of a JSON cell. Integers are nanoseconds since the epoch.
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::parse_str(s),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .map(|nanos| Timestamp::At(Utc.timestamp_nanos(nanos)))
                .unwrap_or(Timestamp::NotATime),
            _ => Timestamp::NotATime,
        }
    }

    pub fn parse_str(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Timestamp::NotATime;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Timestamp::At(dt.with_timezone(&Utc));
        }
        for format in OFFSET_DATETIME_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(raw, format) {
                return Timestamp::At(dt.with_timezone(&Utc));
            }
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Timestamp::At(dt.with_timezone(&Utc));
        }
        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Timestamp::At(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Timestamp::At(naive.and_utc()))
            .unwrap_or(Timestamp::NotATime)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Timestamp::At(_))
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::At(dt) => Some(*dt),
            Timestamp::NotATime => None,
        }
    }

    /// `HH:MM`, or `None` for the invalid marker.
    pub fn hour_minute(&self) -> Option<String> {
        self.as_datetime().map(|dt| dt.format("%H:%M").to_string())
    }

    /// Chart encoding: RFC 3339 string, `null` for the invalid marker.
    pub fn to_json(&self) -> Value {
        match self {
            Timestamp::At(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Timestamp::NotATime => Value::Null,
        }
    }
}

/// Row labels of a table. Record arrays are indexed by position; column
/// objects are indexed by their inner keys.
#[derive(Debug, Clone, PartialEq)]
pub enum TableIndex {
    Positional,
    Labels(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineTable {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
    index: TableIndex,
}

impl TimelineTable {
    pub fn from_records(rows: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        Self {
            columns,
            rows,
            index: TableIndex::Positional,
        }
    }

    /// Accepts an array of records, a column-oriented object
    /// (`{"column": {"label": value, ...}, ...}`) or `null` (an empty table).
    /// Scalar rows land in a single `0` column.
    pub fn from_json(name: &str, value: &Value) -> Result<Self, PayloadError> {
        match value {
            Value::Null => Ok(Self::from_records(Vec::new())),
            Value::Array(items) => Ok(Self::from_records(items.iter().map(record).collect())),
            Value::Object(columns) => Self::from_column_object(name, columns),
            other => Err(PayloadError::InvalidTable {
                name: name.to_string(),
                reason: format!("expected an array or object, got {}", other),
            }),
        }
    }

    fn from_column_object(name: &str, columns: &Map<String, Value>) -> Result<Self, PayloadError> {
        let mut labels: Vec<String> = Vec::new();
        for (column, cells) in columns {
            let cells = cells.as_object().ok_or_else(|| PayloadError::InvalidTable {
                name: name.to_string(),
                reason: format!("column '{}' is not an object keyed by row label", column),
            })?;
            for label in cells.keys() {
                if !labels.contains(label) {
                    labels.push(label.clone());
                }
            }
        }

        let rows = labels
            .iter()
            .map(|label| {
                columns
                    .iter()
                    .map(|(column, cells)| {
                        let cell = cells.get(label).cloned().unwrap_or(Value::Null);
                        (column.clone(), cell)
                    })
                    .collect::<Map<String, Value>>()
            })
            .collect();

        Ok(Self {
            columns: columns.keys().cloned().collect(),
            rows,
            index: TableIndex::Labels(labels),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn index(&self) -> &TableIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Cell values of one column in row order; absent cells read as `null`.
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |row| row.get(name).unwrap_or(&NULL))
    }
}

/// An object item as-is; anything else as `{"0": item}`.
pub fn record(item: &Value) -> Map<String, Value> {
    match item {
        Value::Object(record) => record.clone(),
        other => {
            let mut record = Map::new();
            record.insert("0".to_string(), other.clone());
            record
        }
    }
}

/// One long-form observation: a single (series, value) pair of a wide row.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub timestamp: Timestamp,
    pub series: String,
    pub value: Option<f64>,
}

/// One point of a single-column series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: Timestamp,
    pub value: Option<f64>,
}
