// Dashboard domain model - everything one render pass shows
use serde_json::{Map, Value};

use super::metrics::CurrentMetrics;
use super::timeline::{LongRow, SeriesPoint};

/// A user-visible message attached to a section of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(m) | Notice::Warning(m) | Notice::Error(m) => m,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimelineSection<T> {
    pub notices: Vec<Notice>,
    pub rows: Vec<T>,
}

impl<T> TimelineSection<T> {
    pub fn new(notices: Vec<Notice>, rows: Vec<T>) -> Self {
        Self { notices, rows }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub metrics: CurrentMetrics,
    pub requests: TimelineSection<SeriesPoint>,
    pub response_times: TimelineSection<LongRow>,
    pub system_usage: TimelineSection<LongRow>,
    pub error_events: Vec<Map<String, Value>>,
}
