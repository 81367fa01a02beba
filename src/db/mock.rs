//! In-memory connector that records every call, for ordering tests.

use crate::db::registry::{Connector, SchemaConnection};
use crate::error::{DbResult, SweepError};
use crate::models::ConnectionConfig;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(String),
    Delete(String, String),
    Close(String),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingConnector {
    calls: Arc<Mutex<Vec<Call>>>,
    failing_opens: HashSet<String>,
    failing_deletes: HashSet<(String, String)>,
    failing_closes: HashSet<String>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_open(mut self, schema: &str) -> Self {
        self.failing_opens.insert(schema.to_string());
        self
    }

    pub fn fail_delete(mut self, schema: &str, table: &str) -> Self {
        self.failing_deletes
            .insert((schema.to_string(), table.to_string()));
        self
    }

    pub fn fail_close(mut self, schema: &str) -> Self {
        self.failing_closes.insert(schema.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Deletes issued so far, as `(schema, table)`.
    pub fn deletes(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(schema, table) => Some((schema, table)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Connector for RecordingConnector {
    type Connection = RecordingConnection;

    async fn open(&self, _config: &ConnectionConfig, schema: &str) -> DbResult<Self::Connection> {
        self.record(Call::Open(schema.to_string()));
        if self.failing_opens.contains(schema) {
            return Err(SweepError::connection(
                schema,
                "connection refused",
                "Check that the server is running",
            ));
        }
        Ok(RecordingConnection {
            schema: schema.to_string(),
            connector: self.clone(),
        })
    }
}

#[derive(Debug)]
pub struct RecordingConnection {
    schema: String,
    connector: RecordingConnector,
}

impl SchemaConnection for RecordingConnection {
    async fn delete_all(&self, table: &str) -> DbResult<u64> {
        self.connector
            .record(Call::Delete(self.schema.clone(), table.to_string()));
        let key = (self.schema.clone(), table.to_string());
        if self.connector.failing_deletes.contains(&key) {
            return Err(SweepError::database(
                format!("relation \"{table}\" does not exist"),
                Some("42P01".to_string()),
            ));
        }
        Ok(1)
    }

    async fn close(&self) -> DbResult<()> {
        self.connector.record(Call::Close(self.schema.clone()));
        if self.connector.failing_closes.contains(&self.schema) {
            return Err(SweepError::database("connection reset", None));
        }
        Ok(())
    }
}
