use anyhow::{anyhow, Result};
use clap::ValueEnum;
use std::path::PathBuf;

use crate::report::OutputFormat;

pub const DATA_ENV_VAR: &str = "CHEFOPS_DATA";
pub const FORMAT_ENV_VAR: &str = "CHEFOPS_FORMAT";
pub const DEFAULT_DATA_PATH: &str = "data/kitchen.json";
/// `RUST_LOG` fallback. Progress logs stay hidden unless asked for.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings taken from the environment (and `.env`, once `dotenv` has run).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Kitchen data file.
    pub data_path: PathBuf,
    /// Output format used when a command is given no `--format`.
    pub format: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            format: OutputFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(DATA_ENV_VAR) {
            config.data_path = PathBuf::from(path.trim());
        }
        if let Some(raw) = get(FORMAT_ENV_VAR) {
            config.format = OutputFormat::from_str(raw.trim(), true).map_err(|_| {
                anyhow!(
                    "{} must be one of table, markdown, csv, json (got '{}')",
                    FORMAT_ENV_VAR,
                    raw
                )
            })?;
        }

        Ok(config)
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_data_path(mut self, data_path: Option<PathBuf>) -> Self {
        if let Some(path) = data_path {
            self.data_path = path;
        }
        self
    }
}
