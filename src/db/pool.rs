//! sqlx-backed schema connections.
//!
//! Each schema gets its own database-specific pool (MySqlPool, PgPool,
//! SqlitePool) capped at a single connection, so one schema holds exactly one
//! live session for the whole run.

use crate::db::registry::{Connector, SchemaConnection};
use crate::error::{DbResult, SweepError};
use crate::models::{ConnectionConfig, DatabaseType};
use sqlx::{
    MySqlPool, PgPool, SqlitePool, mysql::MySqlConnectOptions, mysql::MySqlPoolOptions,
    postgres::PgPoolOptions, sqlite::SqliteConnectOptions, sqlite::SqlitePoolOptions,
};
use std::str::FromStr;
use tracing::{debug, info};

/// Live sessions per schema.
const CONNECTIONS_PER_SCHEMA: u32 = 1;

/// Database-specific connection pool (avoids AnyPool limitations).
#[derive(Debug)]
pub enum DbPool {
    MySql(MySqlPool),
    Postgres(PgPool),
    SQLite(SqlitePool),
}

impl DbPool {
    /// Get the database type for this pool.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbPool::MySql(_) => DatabaseType::MySQL,
            DbPool::Postgres(_) => DatabaseType::PostgreSQL,
            DbPool::SQLite(_) => DatabaseType::SQLite,
        }
    }

    /// Check whether the pool has been closed.
    pub fn is_closed(&self) -> bool {
        impl_db_dispatch!(self, {
            MySql(p) => p.is_closed(),
            Postgres(p) => p.is_closed(),
            SQLite(p) => p.is_closed(),
        })
    }
}

impl SchemaConnection for DbPool {
    async fn delete_all(&self, table: &str) -> DbResult<u64> {
        let sql = format!("DELETE FROM {}", self.db_type().quote_identifier(table));
        debug!(sql = %sql, "Executing delete");

        let rows = impl_db_dispatch!(self, {
            MySql(p) => sqlx::query(&sql).execute(p).await?.rows_affected(),
            Postgres(p) => sqlx::query(&sql).execute(p).await?.rows_affected(),
            SQLite(p) => sqlx::query(&sql).execute(p).await?.rows_affected(),
        });
        Ok(rows)
    }

    async fn close(&self) -> DbResult<()> {
        impl_db_dispatch!(self, {
            MySql(p) => p.close().await,
            Postgres(p) => p.close().await,
            SQLite(p) => p.close().await,
        });
        Ok(())
    }
}

/// Opens one [`DbPool`] per schema for a fixed driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxConnector {
    db_type: DatabaseType,
}

impl SqlxConnector {
    pub fn new(db_type: DatabaseType) -> Self {
        Self { db_type }
    }
}

impl Connector for SqlxConnector {
    type Connection = DbPool;

    async fn open(&self, config: &ConnectionConfig, schema: &str) -> DbResult<DbPool> {
        let db_type = self.db_type;
        let connection_string = config.connection_url(db_type, schema)?;

        info!(
            schema = %schema,
            db_type = %db_type,
            endpoint = %config.masked_connection_url(db_type, schema),
            "Connecting to database"
        );

        let connect_error = |e: sqlx::Error| {
            SweepError::connection(
                schema,
                format!("Failed to connect: {}", e),
                connection_suggestion(db_type, &e),
            )
        };

        match db_type {
            DatabaseType::MySQL => {
                let options = MySqlConnectOptions::from_str(&connection_string)
                    .map_err(connect_error)?
                    .charset("utf8mb4");

                let pool = MySqlPoolOptions::new()
                    .max_connections(CONNECTIONS_PER_SCHEMA)
                    .connect_with(options)
                    .await
                    .map_err(connect_error)?;
                Ok(DbPool::MySql(pool))
            }
            DatabaseType::PostgreSQL => {
                let pool = PgPoolOptions::new()
                    .max_connections(CONNECTIONS_PER_SCHEMA)
                    .connect(&connection_string)
                    .await
                    .map_err(connect_error)?;
                Ok(DbPool::Postgres(pool))
            }
            DatabaseType::SQLite => {
                // A missing database file is an open failure, never a fresh database.
                let options = SqliteConnectOptions::from_str(&connection_string)
                    .map_err(connect_error)?
                    .create_if_missing(false);

                let pool = SqlitePoolOptions::new()
                    .max_connections(CONNECTIONS_PER_SCHEMA)
                    .connect_with(options)
                    .await
                    .map_err(connect_error)?;
                Ok(DbPool::SQLite(pool))
            }
        }
    }
}

/// Generate a helpful suggestion for connection errors.
fn connection_suggestion(db_type: DatabaseType, error: &sqlx::Error) -> String {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") {
        return format!(
            "Check that the {} server is running and accessible",
            db_type
        );
    }

    if error_str.contains("authentication") || error_str.contains("password") {
        return "Verify the username and password".to_string();
    }

    if error_str.contains("does not exist")
        || error_str.contains("unknown database")
        || error_str.contains("unable to open database file")
    {
        return "Check that the database exists; the postfix is appended to most schema names"
            .to_string();
    }

    if error_str.contains("tls") || error_str.contains("ssl") {
        return "Check TLS/SSL configuration on the server".to_string();
    }

    match db_type {
        DatabaseType::PostgreSQL => "Verify the host and port of the PostgreSQL server".to_string(),
        DatabaseType::MySQL => "Verify the host and port of the MySQL server".to_string(),
        DatabaseType::SQLite => {
            "Verify the host directory contains <schema>.db files".to_string()
        }
    }
}
