// Dashboard service - One render pass: fetch, normalize, reshape
use crate::application::metrics_source::MetricsSource;
use crate::application::normalizer::{NormalizedTimeline, resolve_timestamps};
use crate::domain::dashboard::{Dashboard, Notice, TimelineSection};
use crate::domain::error::{DashboardError, PayloadError};
use crate::domain::metrics::{
    DashboardPayload, REQUESTS_TIMELINE, RESPONSE_TIMES_TIMELINE, SYSTEM_METRICS_TIMELINE,
};
use crate::domain::timeline::TimelineTable;
use std::sync::Arc;
use std::time::Instant;

pub const REQUESTS_COUNT_COLUMN: &str = "requests_count";

#[derive(Clone)]
pub struct DashboardService {
    source: Arc<dyn MetricsSource>,
}

impl DashboardService {
    pub fn new(source: Arc<dyn MetricsSource>) -> Self {
        Self { source }
    }

    /// Runs a full pass. Only a failed fetch or a missing section aborts;
    /// timestamp problems and unusable timeline shapes stay local to their
    /// section.
    pub async fn build_dashboard(&self) -> Result<Dashboard, DashboardError> {
        let start_time = Instant::now();

        let raw = self.source.fetch_dashboard().await.map_err(|e| {
            tracing::error!("Error fetching dashboard payload: {:#}", e);
            DashboardError::Connectivity(e)
        })?;

        let payload = DashboardPayload::from_json(raw).map_err(|e| {
            tracing::error!("Malformed dashboard payload: {}", e);
            e
        })?;
        let history = payload.historical_data;

        tracing::debug!(
            "Timeline sizes: requests={}, response_times={}, system={}, error_events={}",
            table_len(&history.requests),
            table_len(&history.response_times),
            table_len(&history.system_metrics),
            history.error_events.len()
        );

        let requests = timeline_section(history.requests, REQUESTS_TIMELINE, |t| {
            t.series(REQUESTS_COUNT_COLUMN)
        });
        let response_times = timeline_section(
            history.response_times,
            RESPONSE_TIMES_TIMELINE,
            NormalizedTimeline::melt,
        );
        let system_usage = timeline_section(
            history.system_metrics,
            SYSTEM_METRICS_TIMELINE,
            NormalizedTimeline::melt,
        );

        tracing::info!(
            "Dashboard built in {} ms",
            start_time.elapsed().as_millis()
        );

        Ok(Dashboard {
            metrics: payload.current_metrics,
            requests,
            response_times,
            system_usage,
            error_events: history.error_events,
        })
    }
}

/// Normalizes one table and derives its chart rows. An unusable table becomes
/// an empty section carrying the error.
fn timeline_section<T>(
    table: Result<TimelineTable, PayloadError>,
    label: &str,
    rows: impl FnOnce(&NormalizedTimeline) -> Vec<T>,
) -> TimelineSection<T> {
    match table {
        Ok(table) => {
            let normalized = resolve_timestamps(table, label);
            tracing::debug!("{} timestamps taken from {:?}", label, normalized.source);
            let rows = rows(&normalized);
            TimelineSection::new(normalized.notices, rows)
        }
        Err(e) => {
            tracing::error!("Skipping {}: {}", label, e);
            TimelineSection::new(vec![Notice::Error(e.to_string())], Vec::new())
        }
    }
}

fn table_len(table: &Result<TimelineTable, PayloadError>) -> usize {
    table.as_ref().map_or(0, TimelineTable::len)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    pub(crate) struct StubSource {
        pub payload: Option<Value>,
    }

    #[async_trait]
    impl MetricsSource for StubSource {
        async fn fetch_dashboard(&self) -> anyhow::Result<Value> {
            self.payload
                .clone()
                .ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    pub(crate) fn sample_payload() -> Value {
        json!({
            "current_metrics": {
                "total_requests": 15230,
                "success_rate": 0.1234,
                "avg_response_time": 87.5,
                "active_users": 321,
                "error_rate_5xx": 0.0042,
                "error_rate_4xx": 0.0315,
                "failed_logins_rate": 0.02,
                "current_timestamp": "2024-05-01T12:00:00Z",
                "data_source": "prometheus"
            },
            "historical_data": {
                "http_requests_timeline": [
                    {"timestamp": "2024-05-01T10:00:00Z", "requests_count": 120},
                    {"timestamp": "2024-05-01T11:00:00Z", "requests_count": 140}
                ],
                "response_times_timeline": [
                    {"created_at": "2024-05-01T10:00:00Z", "p50": 40, "p95": 120, "p99": 300},
                    {"created_at": "2024-05-01T11:00:00Z", "p50": 42, "p95": 125, "p99": 310}
                ],
                "system_metrics_timeline": [
                    {"cpu": 35.5, "memory": 61.0}
                ],
                "error_events": [
                    {"timestamp": "2024-05-01T10:15:00Z", "type": "5xx", "message": "<upstream timeout>"}
                ]
            }
        })
    }

    pub(crate) fn service(payload: Option<Value>) -> DashboardService {
        DashboardService::new(Arc::new(StubSource { payload }))
    }

    #[tokio::test]
    async fn test_build_dashboard_sections_are_independent() {
        let dashboard = service(Some(sample_payload())).build_dashboard().await.unwrap();

        assert_eq!(dashboard.metrics.total_requests, 15230);

        assert!(dashboard.requests.notices.is_empty());
        assert_eq!(dashboard.requests.rows.len(), 2);
        assert_eq!(dashboard.requests.rows[1].value, Some(140.0));

        assert!(matches!(dashboard.response_times.notices.as_slice(), [Notice::Warning(_)]));
        // created_at supplies the time and is still its own series.
        assert_eq!(dashboard.response_times.rows.len(), 8);

        assert!(matches!(dashboard.system_usage.notices.as_slice(), [Notice::Error(_)]));
        assert_eq!(dashboard.system_usage.rows.len(), 2);

        assert_eq!(dashboard.error_events.len(), 1);
    }

    #[tokio::test]
    async fn test_null_and_scalar_timelines_render() {
        let mut payload = sample_payload();
        payload["historical_data"]["system_metrics_timeline"] = Value::Null;
        payload["historical_data"]["response_times_timeline"] = json!([1, 2]);

        let dashboard = service(Some(payload)).build_dashboard().await.unwrap();

        assert!(dashboard.system_usage.rows.is_empty());
        assert!(matches!(dashboard.system_usage.notices.as_slice(), [Notice::Error(_)]));

        let series: Vec<&str> = dashboard
            .response_times
            .rows
            .iter()
            .map(|r| r.series.as_str())
            .collect();
        assert_eq!(series, ["0", "0"]);
        assert_eq!(dashboard.response_times.rows[1].value, Some(2.0));

        assert_eq!(dashboard.requests.rows.len(), 2);
        assert_eq!(dashboard.error_events.len(), 1);
    }

    #[tokio::test]
    async fn test_unusable_timeline_only_fails_its_section() {
        let mut payload = sample_payload();
        payload["historical_data"]["system_metrics_timeline"] = json!({"cpu": 35.5});

        let dashboard = service(Some(payload)).build_dashboard().await.unwrap();

        assert!(dashboard.system_usage.rows.is_empty());
        match dashboard.system_usage.notices.as_slice() {
            [Notice::Error(message)] => assert!(message.contains("system_metrics_timeline")),
            other => panic!("expected one error, got {:?}", other),
        }

        assert!(dashboard.requests.notices.is_empty());
        assert_eq!(dashboard.requests.rows.len(), 2);
        assert_eq!(dashboard.response_times.rows.len(), 8);
        assert_eq!(dashboard.metrics.active_users, 321);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_connectivity_error() {
        let err = service(None).build_dashboard().await.unwrap_err();

        assert!(matches!(err, DashboardError::Connectivity(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_missing_metric_aborts_pass() {
        let mut payload = sample_payload();
        payload["current_metrics"]
            .as_object_mut()
            .unwrap()
            .remove("success_rate");

        let err = service(Some(payload)).build_dashboard().await.unwrap_err();
        assert!(matches!(err, DashboardError::Payload(_)));
    }
}
