//! The delete sweep.
//!
//! Walks the catalog in declared order and empties every table of every
//! schema through the registry's connections:
//! - a schema without a registered connection aborts the run;
//! - a failed delete is recorded and the sweep moves on to the next table.
//!
//! Statements are independent. Nothing is wrapped in a transaction and
//! nothing is retried, so a later failure never undoes an earlier delete.

use crate::db::{ConnectionRegistry, SchemaConnection};
use crate::error::DbResult;
use crate::models::SchemaCatalog;
use tracing::{error, info, warn};

/// Progress of a [`Sweeper`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepState {
    #[default]
    NotStarted,
    Running,
    /// Every schema was visited. Individual deletes may still have failed.
    Completed,
    /// A schema had no connection in the registry.
    Aborted,
}

/// Result of one delete statement.
#[derive(Debug)]
pub struct TableOutcome {
    pub schema: String,
    pub table: String,
    /// Rows deleted, or the statement error.
    pub result: DbResult<u64>,
}

impl TableOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-table outcomes of a completed sweep, in issue order.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub schemas_entered: usize,
    pub tables: Vec<TableOutcome>,
}

impl SweepReport {
    pub fn tables_cleaned(&self) -> usize {
        self.tables.iter().filter(|t| t.is_ok()).count()
    }

    pub fn tables_failed(&self) -> usize {
        self.tables.len() - self.tables_cleaned()
    }

    pub fn rows_deleted(&self) -> u64 {
        self.tables
            .iter()
            .filter_map(|t| t.result.as_ref().ok())
            .sum()
    }

    /// Outcomes whose statement failed.
    pub fn failures(&self) -> impl Iterator<Item = &TableOutcome> {
        self.tables.iter().filter(|t| !t.is_ok())
    }
}

/// Runs the delete sweep against borrowed registry connections.
///
/// The sweeper never closes a connection; teardown belongs to
/// [`ConnectionRegistry::close`].
#[derive(Debug)]
pub struct Sweeper<'a, C> {
    registry: &'a ConnectionRegistry<C>,
    state: SweepState,
}

impl<'a, C: SchemaConnection> Sweeper<'a, C> {
    pub fn new(registry: &'a ConnectionRegistry<C>) -> Self {
        Self {
            registry,
            state: SweepState::NotStarted,
        }
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    /// Delete all rows of every catalog table, schema by schema.
    ///
    /// Returns `ConnectionNotFound` as soon as a schema has no connection;
    /// no table of that schema or of any later schema is touched.
    pub async fn run(&mut self, catalog: &SchemaCatalog) -> DbResult<SweepReport> {
        self.state = SweepState::Running;
        let mut report = SweepReport::default();

        for schema in catalog {
            info!(
                schema = %schema.name,
                tables = schema.tables.len(),
                "Cleaning schema"
            );
            report.schemas_entered += 1;

            let connection = match self.registry.get(&schema.name) {
                Ok(connection) => connection,
                Err(e) => {
                    error!(schema = %schema.name, error = %e, "Aborting sweep");
                    self.state = SweepState::Aborted;
                    return Err(e);
                }
            };

            for table in &schema.tables {
                let result = connection.delete_all(table).await;
                match &result {
                    Ok(rows) => info!(schema = %schema.name, table = %table, rows, "Cleaned table"),
                    Err(e) => warn!(
                        schema = %schema.name,
                        table = %table,
                        error = %e,
                        "Failed to clean table"
                    ),
                }
                report.tables.push(TableOutcome {
                    schema: schema.name.clone(),
                    table: table.clone(),
                    result,
                });
            }
        }

        self.state = SweepState::Completed;
        info!(
            schemas = report.schemas_entered,
            cleaned = report.tables_cleaned(),
            failed = report.tables_failed(),
            rows = report.rows_deleted(),
            "Sweep completed"
        );
        Ok(report)
    }
}
