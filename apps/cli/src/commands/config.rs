//! # Config Commands
//!
//! Prints the effective configuration or writes it out as a starting file.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::output::{self, Render};
use crate::ConfigAction;
use mediroom_store::StoreConfig;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    /// File the configuration is read from; `None` if no location is known.
    pub config_path: Option<String>,
    pub database_path: String,
    pub max_connections: u32,
    pub operation_timeout_ms: u64,
    pub write_queue_capacity: usize,
}

impl ConfigView {
    fn new(config: &StoreConfig, path: Option<PathBuf>) -> Self {
        ConfigView {
            config_path: path.map(|p| p.display().to_string()),
            database_path: config.database.path.display().to_string(),
            max_connections: config.database.max_connections,
            operation_timeout_ms: config.database.operation_timeout_ms,
            write_queue_capacity: config.store.write_queue_capacity,
        }
    }
}

impl Render for ConfigView {
    fn render(&self) -> String {
        format!(
            "Config file:     {}\nDatabase:        {}\nMax connections: {}\nOp timeout:      {} ms\nWrite queue:     {}",
            self.config_path.as_deref().unwrap_or("(none)"),
            self.database_path,
            self.max_connections,
            self.operation_timeout_ms,
            self.write_queue_capacity
        )
    }
}

/// Runs a config subcommand.
pub fn run(action: &ConfigAction, path: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => output::emit(&show(path)?, json),
        ConfigAction::Init => output::emit(&init(path)?, json),
    }
}

/// Loads the effective configuration (defaults, file, environment).
pub fn show(path: Option<PathBuf>) -> Result<ConfigView, ApiError> {
    let config = StoreConfig::load(path.clone())?;
    Ok(ConfigView::new(
        &config,
        path.or_else(StoreConfig::default_config_path),
    ))
}

/// Writes the effective configuration to the config file.
pub fn init(path: Option<PathBuf>) -> Result<ConfigView, ApiError> {
    let config = StoreConfig::load(path.clone())?;
    config.save(path.clone())?;

    let written = path.or_else(StoreConfig::default_config_path);
    info!(path = ?written, "Configuration written");
    Ok(ConfigView::new(&config, written))
}
