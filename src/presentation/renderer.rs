// HTML renderer - cards, captions, charts and the error-event table
use crate::domain::dashboard::{Dashboard, Notice};
use crate::domain::error::DashboardError;
use crate::presentation::charts::{requests_chart, response_times_chart, system_usage_chart};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde_json::{Map, Value};

const PAGE_TITLE: &str = "Monitoring Dashboard";
const NO_ERROR_EVENTS: &str = "No error events recorded in the last day.";

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 0; background: #fafafa; color: #262730; }
main { padding: 24px 48px; }
h2 { margin-top: 32px; }
.cards { display: grid; gap: 16px; margin-bottom: 16px; }
.cards.four { grid-template-columns: repeat(4, 1fr); }
.cards.three { grid-template-columns: repeat(3, 1fr); }
.card { background: #fff; border: 1px solid #e6e6e6; border-radius: 8px; padding: 12px 16px; }
.card-label { font-size: 14px; color: #555; }
.card-value { font-size: 32px; }
.caption { font-size: 13px; color: #777; margin: 4px 0; }
.notice { border-radius: 6px; padding: 12px 16px; margin: 8px 0; }
.notice.info { background: #e8f1fb; }
.notice.warning { background: #fff8e1; }
.notice.error { background: #fdecea; }
.chart { width: 100%; }
table { border-collapse: collapse; width: 100%; background: #fff; }
th, td { border: 1px solid #e6e6e6; padding: 6px 10px; text-align: left; font-size: 13px; }
"#;

pub fn format_count(value: i64) -> String {
    value.to_string()
}

/// Fractions in [0, 1] shown as percentages with two decimals.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn format_millis(millis: f64) -> String {
    format!("{:.2} ms", millis)
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let metrics = &dashboard.metrics;

    page(html! {
        h2 { "Current Metrics" }
        (cards("four", &[
            ("Total Requests", format_count(metrics.total_requests)),
            ("Success Rate", format_percent(metrics.success_rate)),
            ("Avg Response Time", format_millis(metrics.avg_response_time)),
            ("Active Users", format_count(metrics.active_users)),
        ]))
        (cards("three", &[
            ("5xx Errors", format_percent(metrics.error_rate_5xx)),
            ("4xx Errors", format_percent(metrics.error_rate_4xx)),
            ("Failed Logins", format_percent(metrics.failed_logins_rate)),
        ]))
        p.caption { "Last update: " (metrics.current_timestamp) }
        p.caption { "Data source: " (metrics.data_source) }

        h2 { "Requests per Hour" }
        (notices(&dashboard.requests.notices))
        (chart("chart-requests", &requests_chart(&dashboard.requests.rows)))

        h2 { "Response Times (p50, p95, p99)" }
        (notices(&dashboard.response_times.notices))
        (chart("chart-response-times", &response_times_chart(&dashboard.response_times.rows)))

        h2 { "System Usage" }
        (notices(&dashboard.system_usage.notices))
        (chart("chart-system-usage", &system_usage_chart(&dashboard.system_usage.rows)))

        h2 { "Error Events" }
        @if dashboard.error_events.is_empty() {
            (notice(&Notice::Info(NO_ERROR_EVENTS.to_string())))
        } @else {
            (events_table(&dashboard.error_events))
        }
    })
}

/// The page for an aborted pass: title plus a single error.
pub fn render_failure(error: &DashboardError) -> String {
    page(notice(&Notice::Error(error.to_string())))
}

fn page(content: Markup) -> String {
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (PAGE_TITLE) }
                style { (PreEscaped(STYLE)) }
                script src="https://cdn.jsdelivr.net/npm/vega@5" {}
                script src="https://cdn.jsdelivr.net/npm/vega-lite@5" {}
                script src="https://cdn.jsdelivr.net/npm/vega-embed@6" {}
            }
            body {
                main {
                    h1 { (PAGE_TITLE) }
                    (content)
                }
            }
        }
    };

    markup.into_string()
}

fn cards(class: &str, items: &[(&str, String)]) -> Markup {
    html! {
        div class=(format!("cards {}", class)) {
            @for (label, value) in items {
                div.card {
                    div.card-label { (label) }
                    div.card-value { (value) }
                }
            }
        }
    }
}

fn notice(notice: &Notice) -> Markup {
    let class = match notice {
        Notice::Info(_) => "notice info",
        Notice::Warning(_) => "notice warning",
        Notice::Error(_) => "notice error",
    };

    html! {
        div class=(class) { (notice.message()) }
    }
}

fn notices(list: &[Notice]) -> Markup {
    html! {
        @for item in list {
            (notice(item))
        }
    }
}

fn chart(id: &str, spec: &Value) -> Markup {
    // `</` inside an inline script would close the element early.
    let spec = spec.to_string().replace("</", "<\\/");
    let embed = format!(
        "vegaEmbed('#{}', {}, {{\"actions\": false}});",
        id, spec
    );

    html! {
        div.chart id=(id) {}
        script { (PreEscaped(embed)) }
    }
}

fn events_table(events: &[Map<String, Value>]) -> Markup {
    let mut columns: Vec<&str> = Vec::new();
    for event in events {
        for key in event.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    html! {
        table.events {
            thead {
                tr {
                    @for column in &columns {
                        th { (column) }
                    }
                }
            }
            tbody {
                @for event in events {
                    tr {
                        @for column in &columns {
                            td { (event.get(*column).map(cell_text).unwrap_or_default()) }
                        }
                    }
                }
            }
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
