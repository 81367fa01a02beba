//! db-sweeper library
//!
//! Connects to a fixed catalog of service databases and deletes all rows from
//! the declared tables of each, to reset environments between test runs.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod sweep;

pub use config::Config;
pub use error::{DbResult, SweepError};
pub use sweep::{SweepReport, SweepState, Sweeper};
