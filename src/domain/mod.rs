// Domain layer - Dashboard payload and view models
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod timeline;
