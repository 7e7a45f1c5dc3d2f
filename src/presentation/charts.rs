// Vega-Lite chart specifications for the timeline sections
use crate::application::dashboard_service::REQUESTS_COUNT_COLUMN;
use crate::application::normalizer::usage_label;
use crate::domain::timeline::{LongRow, SeriesPoint};
use serde_json::{Value, json};

const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const CHART_HEIGHT: u32 = 300;
const BAR_SIZE: u32 = 10;

/// Line+point chart of request volume over time.
pub fn requests_chart(points: &[SeriesPoint]) -> Value {
    let values: Vec<Value> = points
        .iter()
        .map(|p| {
            json!({
                "timestamp": p.timestamp.to_json(),
                REQUESTS_COUNT_COLUMN: p.value,
            })
        })
        .collect();

    json!({
        "$schema": SCHEMA,
        "width": "container",
        "height": CHART_HEIGHT,
        "data": { "values": values },
        "mark": { "type": "line", "point": true },
        "encoding": {
            "x": { "field": "timestamp", "type": "temporal" },
            "y": { "field": REQUESTS_COUNT_COLUMN, "type": "quantitative" },
            "tooltip": [
                { "field": "timestamp", "type": "temporal" },
                { "field": REQUESTS_COUNT_COLUMN, "type": "quantitative" }
            ]
        }
    })
}

/// One line per percentile series.
pub fn response_times_chart(rows: &[LongRow]) -> Value {
    let values: Vec<Value> = rows
        .iter()
        .map(|r| {
            json!({
                "timestamp": r.timestamp.to_json(),
                "percentile": r.series,
                "latency_ms": r.value,
            })
        })
        .collect();

    json!({
        "$schema": SCHEMA,
        "width": "container",
        "height": CHART_HEIGHT,
        "data": { "values": values },
        "mark": { "type": "line", "point": true },
        "encoding": {
            "x": { "field": "timestamp", "type": "temporal" },
            "y": { "field": "latency_ms", "type": "quantitative", "title": "Latency (ms)" },
            "color": { "field": "percentile", "type": "nominal", "title": "Percentile" },
            "tooltip": [
                { "field": "timestamp", "type": "temporal" },
                { "field": "percentile", "type": "nominal" },
                { "field": "latency_ms", "type": "quantitative" }
            ]
        }
    })
}

/// Bars keyed by `HH:MM - metric` so adjacent samples stay apart; the key is
/// rebuilt on every render.
pub fn system_usage_chart(rows: &[LongRow]) -> Value {
    let values: Vec<Value> = rows
        .iter()
        .map(|r| {
            json!({
                "timestamp": r.timestamp.to_json(),
                "metric": r.series,
                "percent": r.value,
                "time_metric": usage_label(r),
            })
        })
        .collect();

    json!({
        "$schema": SCHEMA,
        "width": "container",
        "height": CHART_HEIGHT,
        "data": { "values": values },
        "mark": { "type": "bar", "size": BAR_SIZE },
        "encoding": {
            "x": { "field": "time_metric", "type": "nominal", "title": null, "axis": null },
            "y": { "field": "percent", "type": "quantitative", "title": "Usage (%)" },
            "color": { "field": "metric", "type": "nominal", "title": "Metric" },
            "tooltip": [
                { "field": "timestamp", "type": "temporal" },
                { "field": "metric", "type": "nominal" },
                { "field": "percent", "type": "quantitative" }
            ]
        }
    })
}
