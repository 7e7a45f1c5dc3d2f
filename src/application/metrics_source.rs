// Source trait for the monitoring payload
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch the raw dashboard payload. Fails on network errors or a body
    /// that is not JSON.
    async fn fetch_dashboard(&self) -> anyhow::Result<Value>;
}
