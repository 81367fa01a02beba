//! db-sweeper - Main entry point.
//!
//! Opens one connection per catalog schema, empties the declared tables and
//! tears the connections down. This is the only place that decides the
//! process exit code.

use clap::{CommandFactory, Parser};
use colored::Colorize;
use db_sweeper::config::Config;
use db_sweeper::db::{ConnectionRegistry, SqlxConnector};
use db_sweeper::error::DbResult;
use db_sweeper::models::ConnectionConfig;
use db_sweeper::sweep::{SweepReport, Sweeper};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const SUCCESS_MESSAGE: &str = "Cleaned successfully";

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(!config.no_color),
            )
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Without credentials there is nothing to connect to: show usage and stop
    let connection_config = match config.connection_config() {
        Ok(connection_config) => connection_config,
        Err(e) => {
            println!("{e}");
            println!();
            if let Err(io_err) = Config::command().print_help() {
                eprintln!("Failed to print usage: {io_err}");
            }
            return ExitCode::SUCCESS;
        }
    };

    init_tracing(&config);

    info!(
        driver = %config.driver,
        postfix = %config.postfix,
        "Starting db-sweeper v{}",
        env!("CARGO_PKG_VERSION")
    );

    match run(&config, &connection_config).await {
        Ok(report) => {
            print_success(&config, &report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, suggestion = ?e.suggestion(), "Sweep failed");
            ExitCode::FAILURE
        }
    }
}

/// Connect, sweep, and always tear down what was opened.
async fn run(config: &Config, connection_config: &ConnectionConfig) -> DbResult<SweepReport> {
    let catalog = config.catalog()?;
    info!(
        schemas = catalog.len(),
        tables = catalog.table_count(),
        "Catalog loaded"
    );

    let connector = SqlxConnector::new(config.driver);
    let registry = ConnectionRegistry::init(&connector, connection_config, &catalog).await?;

    let result = Sweeper::new(&registry).run(&catalog).await;
    registry.close().await;
    result
}

/// Final line of a completed sweep. Printed regardless of the log filter.
fn print_success(config: &Config, report: &SweepReport) {
    let message = match report.tables_failed() {
        0 => SUCCESS_MESSAGE.to_string(),
        failed => format!("{SUCCESS_MESSAGE} ({failed} tables not cleaned)"),
    };
    if config.no_color {
        println!("{message}");
    } else {
        println!("{}", message.green().underline());
    }
}
