//! Connection registry.
//!
//! Opens one connection per catalog schema, hands out borrowed handles by
//! schema name during the sweep, and is the only place handles are closed.
//!
//! # Lifecycle
//!
//! - [`ConnectionRegistry::init`] populates the registry in one pass, in
//!   catalog order. The first open failure closes everything opened so far
//!   and returns the error.
//! - [`ConnectionRegistry::get`] is read-only for the rest of the run.
//! - [`ConnectionRegistry::close`] consumes the registry, so no handle can be
//!   reached after teardown.

use crate::error::{DbResult, SweepError};
use crate::models::{ConnectionConfig, SchemaCatalog};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// A live session bound to one schema's database.
#[allow(async_fn_in_trait)]
pub trait SchemaConnection {
    /// Delete every row of `table`, returning the number of rows removed.
    async fn delete_all(&self, table: &str) -> DbResult<u64>;

    /// Release the session.
    async fn close(&self) -> DbResult<()>;
}

/// Opens schema connections from shared credentials.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Connection: SchemaConnection;

    async fn open(&self, config: &ConnectionConfig, schema: &str) -> DbResult<Self::Connection>;
}

#[derive(Debug)]
pub struct ConnectionRegistry<C> {
    connections: HashMap<String, C>,
    /// Catalog order, for deterministic teardown.
    order: Vec<String>,
}

impl<C: SchemaConnection> ConnectionRegistry<C> {
    /// Open a connection for every schema of the catalog.
    pub async fn init<K>(
        connector: &K,
        config: &ConnectionConfig,
        catalog: &SchemaCatalog,
    ) -> DbResult<Self>
    where
        K: Connector<Connection = C>,
    {
        let mut registry = Self {
            connections: HashMap::with_capacity(catalog.len()),
            order: Vec::with_capacity(catalog.len()),
        };

        for schema in catalog {
            match connector.open(config, &schema.name).await {
                Ok(connection) => {
                    debug!(schema = %schema.name, "Connection opened");
                    registry.order.push(schema.name.clone());
                    registry.connections.insert(schema.name.clone(), connection);
                }
                Err(e) => {
                    error!(
                        schema = %schema.name,
                        error = %e,
                        suggestion = ?e.suggestion(),
                        "Failed to open connection"
                    );
                    if !registry.is_empty() {
                        warn!(
                            count = registry.len(),
                            "Closing connections opened before the failure"
                        );
                    }
                    registry.close().await;
                    return Err(e);
                }
            }
        }

        info!(count = registry.len(), "Connections established");
        Ok(registry)
    }

    /// Get the connection of a schema.
    pub fn get(&self, schema: &str) -> DbResult<&C> {
        self.connections
            .get(schema)
            .ok_or_else(|| SweepError::connection_not_found(schema))
    }

    /// Check if a connection exists.
    pub fn contains(&self, schema: &str) -> bool {
        self.connections.contains_key(schema)
    }

    /// Schema names in the order their connections were opened.
    pub fn schemas(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Close all connections, one at a time, in open order.
    ///
    /// A handle that fails to close is logged and the remaining handles are
    /// still closed.
    pub async fn close(mut self) {
        let order = std::mem::take(&mut self.order);
        for schema in order {
            let Some(connection) = self.connections.remove(&schema) else {
                continue;
            };
            info!(schema = %schema, "Closing connection");
            if let Err(e) = connection.close().await {
                warn!(schema = %schema, error = %e, "Failed to close connection");
            }
        }
        info!("All connections closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock::{Call, RecordingConnector};
    use crate::models::SchemaDefinition;

    fn config() -> ConnectionConfig {
        ConnectionConfig::new("root", "keepitsimple", "localhost", 5432)
    }

    fn catalog(names: &[&str]) -> SchemaCatalog {
        SchemaCatalog::new(
            names
                .iter()
                .map(|n| SchemaDefinition::new(*n, ["t1"]))
                .collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_succeeds_for_every_catalog_name() {
        let connector = RecordingConnector::new();
        let catalog = catalog(&["s1", "s2", "s3"]);
        let registry = ConnectionRegistry::init(&connector, &config(), &catalog)
            .await
            .unwrap();

        assert_eq!(registry.len(), 3);
        for schema in &catalog {
            assert!(registry.get(&schema.name).is_ok());
            assert!(registry.contains(&schema.name));
        }
        assert_eq!(registry.schemas().collect::<Vec<_>>(), vec!["s1", "s2", "s3"]);
    }

    #[tokio::test]
    async fn test_get_unknown_schema_is_not_found() {
        let connector = RecordingConnector::new();
        let registry = ConnectionRegistry::init(&connector, &config(), &catalog(&["s1"]))
            .await
            .unwrap();

        let result = registry.get("s2");
        assert!(matches!(
            result,
            Err(SweepError::ConnectionNotFound { ref schema }) if schema == "s2"
        ));
    }

    #[tokio::test]
    async fn test_init_opens_in_catalog_order() {
        let connector = RecordingConnector::new();
        ConnectionRegistry::init(&connector, &config(), &catalog(&["b", "a", "c"]))
            .await
            .unwrap();

        assert_eq!(
            connector.calls(),
            vec![
                Call::Open("b".into()),
                Call::Open("a".into()),
                Call::Open("c".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_init_failure_closes_opened_and_stops() {
        let connector = RecordingConnector::new().fail_open("s2");
        let result =
            ConnectionRegistry::init(&connector, &config(), &catalog(&["s1", "s2", "s3"])).await;

        assert!(matches!(
            result,
            Err(SweepError::Connection { ref schema, .. }) if schema == "s2"
        ));
        assert_eq!(
            connector.calls(),
            vec![
                Call::Open("s1".into()),
                Call::Open("s2".into()),
                Call::Close("s1".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_first_open_failure_closes_nothing() {
        let connector = RecordingConnector::new().fail_open("s1");
        let result = ConnectionRegistry::init(&connector, &config(), &catalog(&["s1", "s2"])).await;

        assert!(result.is_err());
        assert_eq!(connector.calls(), vec![Call::Open("s1".into())]);
    }

    #[tokio::test]
    async fn test_close_releases_every_handle_once_in_order() {
        let connector = RecordingConnector::new();
        let registry =
            ConnectionRegistry::init(&connector, &config(), &catalog(&["s3", "s1", "s2"]))
                .await
                .unwrap();
        registry.close().await;

        let closes: Vec<Call> = connector
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Close(_)))
            .collect();
        assert_eq!(
            closes,
            vec![
                Call::Close("s3".into()),
                Call::Close("s1".into()),
                Call::Close("s2".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_close_failure_does_not_stop_teardown() {
        let connector = RecordingConnector::new().fail_close("s1");
        let registry = ConnectionRegistry::init(&connector, &config(), &catalog(&["s1", "s2"]))
            .await
            .unwrap();
        registry.close().await;

        assert!(connector.calls().contains(&Call::Close("s2".into())));
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_empty_registry() {
        let connector = RecordingConnector::new();
        let registry = ConnectionRegistry::init(&connector, &config(), &SchemaCatalog::default())
            .await
            .unwrap();

        assert!(registry.is_empty());
        assert!(connector.calls().is_empty());
    }
}
