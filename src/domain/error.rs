// Error taxonomy of a single render pass
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Network failure or a body that is not JSON. Aborts the whole page.
    #[error("Failed to connect to the API: {0:#}")]
    Connectivity(#[source] anyhow::Error),

    #[error("Malformed dashboard payload: {0}")]
    Payload(#[from] PayloadError),
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("missing section `{0}`")]
    MissingSection(String),

    #[error("invalid current_metrics: {0}")]
    Metrics(#[source] serde_json::Error),

    #[error("invalid timeline `{name}`: {reason}")]
    InvalidTable { name: String, reason: String },
}
