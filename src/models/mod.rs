//! Data models for db-sweeper.
//!
//! This module re-exports all model types used throughout the application.

pub mod catalog;
pub mod connection;

// Re-export commonly used types
pub use catalog::{SchemaCatalog, SchemaDefinition, SchemaEntry};
pub use connection::{ConnectionConfig, DatabaseType};
