//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection registry: one live connection per catalog schema
//! - sqlx-backed connections for PostgreSQL, MySQL and SQLite
//! - Database dispatch macros for reducing code duplication

#[macro_use]
pub mod macros;
#[cfg(test)]
pub(crate) mod mock;
pub mod pool;
pub mod registry;

pub use pool::{DbPool, SqlxConnector};
pub use registry::{ConnectionRegistry, Connector, SchemaConnection};
