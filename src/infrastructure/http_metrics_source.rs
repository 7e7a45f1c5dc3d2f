// HTTP metrics source - monitoring API client
use crate::application::metrics_source::MetricsSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Issues one GET per fetch. No timeout and no retry: an unresponsive
/// endpoint blocks the render pass until the connection gives up.
#[derive(Debug, Clone)]
pub struct HttpMetricsSource {
    url: String,
    client: reqwest::Client,
}

impl HttpMetricsSource {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn fetch_dashboard(&self) -> Result<Value> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.url))?;

        // The status is not checked; a JSON error body still parses and is
        // judged by its shape.
        tracing::debug!("Monitoring API responded with status {}", response.status());

        let payload = response
            .json::<Value>()
            .await
            .context("Failed to parse monitoring API response as JSON")?;

        Ok(payload)
    }
}
