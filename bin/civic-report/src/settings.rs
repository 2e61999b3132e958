//! Runtime settings: built-in defaults overlaid with `CIVIC__*` environment
//! variables (after `.env` is loaded), e.g. `CIVIC__SERVER__PORT=9000` or
//! `CIVIC__AGGREGATOR__MERGE_RADIUS_M=75`.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};
use cr_core::AggregatorConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    /// Directory for the file store.
    pub data_dir: PathBuf,
    /// Connection string for the SQLite store.
    pub database_url: String,
}

/// Defaults only; callers layer sources on top.
pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("storage.data_dir", "./data")?
        .set_default("storage.database_url", "sqlite:civic_report.db")
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        builder()?
            .add_source(
                Environment::with_prefix("CIVIC")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
