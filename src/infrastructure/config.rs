use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;
use std::net::SocketAddr;

pub const DEFAULT_API_URL: &str = "https://techchalangerapi.onrender.com/api/v1/monitoring/dashboard";
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub source: SourceSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: SocketAddr,
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("source.url", DEFAULT_API_URL)?
        .set_default("server.bind", DEFAULT_BIND)
}

/// Defaults, then `config/dashboard.*` if present, then `DASHBOARD__*` env vars.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = with_defaults()?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
