// Application layer - Render pass use case
pub mod dashboard_service;
pub mod metrics_source;
pub mod normalizer;
