//! Configuration handling for db-sweeper.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use crate::error::{DbResult, SweepError};
use crate::models::{ConnectionConfig, DatabaseType, SchemaCatalog};
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration for db-sweeper.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "db-sweeper",
    about = "Deletes all rows from the declared tables of every service database",
    version,
    author
)]
pub struct Config {
    /// Database user
    #[arg(short = 'u', long, env = "SWEEPER_DB_USER")]
    pub username: Option<String>,

    /// Database password
    #[arg(short = 'P', long, env = "SWEEPER_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database host. For the sqlite driver, the directory holding <schema>.db files.
    #[arg(short = 'H', long, env = "SWEEPER_DB_HOST")]
    pub host: Option<String>,

    /// Database port
    #[arg(short = 'p', long, env = "SWEEPER_DB_PORT")]
    pub port: Option<u16>,

    /// Suffix appended to schema names (the built-in catalog leaves `assign` alone)
    #[arg(long, default_value = "", env = "SWEEPER_POSTFIX")]
    pub postfix: String,

    /// Database driver
    #[arg(long, value_enum, default_value = "postgres", env = "SWEEPER_DRIVER")]
    pub driver: DatabaseType,

    /// JSON catalog replacing the built-in schema list.
    /// Format: {"schemas": [{"name": "claimsvc", "tables": ["claims"], "postfix": true}]}
    #[arg(long, value_name = "PATH", env = "SWEEPER_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "SWEEPER_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "SWEEPER_JSON_LOGS")]
    pub json_logs: bool,

    /// Disable colored output
    #[arg(long, env = "SWEEPER_NO_COLOR")]
    pub no_color: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            username: None,
            password: None,
            host: None,
            port: None,
            postfix: String::new(),
            driver: DatabaseType::default(),
            catalog: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
            no_color: false,
        }
    }

    /// Credentials and endpoint, or the list of required flags that are
    /// missing. Empty values and port 0 count as missing.
    pub fn connection_config(&self) -> DbResult<ConnectionConfig> {
        let username = present(&self.username);
        let password = present(&self.password);
        let host = present(&self.host);
        let port = self.port.filter(|p| *p != 0);

        match (username, password, host, port) {
            (Some(username), Some(password), Some(host), Some(port)) => {
                Ok(ConnectionConfig::new(username, password, host, port))
            }
            _ => {
                let missing = [
                    ("--username", username.is_none()),
                    ("--password", password.is_none()),
                    ("--host", host.is_none()),
                    ("--port", port.is_none()),
                ];
                Err(SweepError::missing_arguments(
                    missing
                        .into_iter()
                        .filter(|(_, absent)| *absent)
                        .map(|(flag, _)| flag),
                ))
            }
        }
    }

    /// The catalog for this run: the `--catalog` file if given, else the
    /// built-in one, with the postfix applied.
    pub fn catalog(&self) -> DbResult<SchemaCatalog> {
        match &self.catalog {
            Some(path) => SchemaCatalog::load(path, &self.postfix),
            None => SchemaCatalog::builtin(&self.postfix),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
