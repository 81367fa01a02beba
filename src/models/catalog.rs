//! Schema catalog models.
//!
//! The catalog is the static, ordered list of schemas a sweep visits and the
//! tables it empties in each. It comes either from the built-in table below
//! or from a JSON file with the same shape.

use crate::error::{DbResult, SweepError};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// One schema of the catalog after postfix resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDefinition {
    pub name: String,
    /// Delete order
    pub tables: Vec<String>,
}

impl SchemaDefinition {
    pub fn new<I, S>(name: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }
}

/// Catalog entry as declared, before the postfix is applied.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    pub tables: Vec<String>,
    /// Whether the run's postfix is appended to `name`.
    #[serde(default = "default_postfix")]
    pub postfix: bool,
}

fn default_postfix() -> bool {
    true
}

impl SchemaEntry {
    fn resolve(self, postfix: &str) -> SchemaDefinition {
        let name = if self.postfix {
            format!("{}{}", self.name, postfix)
        } else {
            self.name
        };
        SchemaDefinition {
            name,
            tables: self.tables,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    schemas: Vec<SchemaEntry>,
}

/// Validated, ordered list of schema definitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemaCatalog {
    schemas: Vec<SchemaDefinition>,
}

impl SchemaCatalog {
    /// Build a catalog, rejecting duplicate schema names and table names that
    /// are not plain (optionally qualified) identifiers.
    pub fn new(schemas: Vec<SchemaDefinition>) -> DbResult<Self> {
        let mut seen = HashSet::new();
        for schema in &schemas {
            if !is_valid_schema_name(&schema.name) {
                return Err(SweepError::invalid_catalog(format!(
                    "schema name '{}' must be non-empty and contain only letters, digits, '_' or '-'",
                    schema.name
                )));
            }
            if !seen.insert(schema.name.as_str()) {
                return Err(SweepError::invalid_catalog(format!(
                    "schema '{}' is declared more than once",
                    schema.name
                )));
            }
            if let Some(table) = schema.tables.iter().find(|t| !is_valid_table_name(t)) {
                return Err(SweepError::invalid_catalog(format!(
                    "table '{}' in schema '{}' is not a valid identifier",
                    table, schema.name
                )));
            }
        }
        Ok(Self { schemas })
    }

    /// Resolve declared entries against a postfix and validate the result.
    pub fn from_entries(entries: Vec<SchemaEntry>, postfix: &str) -> DbResult<Self> {
        Self::new(entries.into_iter().map(|e| e.resolve(postfix)).collect())
    }

    /// Parse a JSON catalog: `{"schemas": [{"name": .., "tables": [..], "postfix": true}]}`.
    pub fn from_json(json: &str, postfix: &str) -> DbResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| SweepError::invalid_catalog(format!("malformed catalog JSON: {e}")))?;
        Self::from_entries(file.schemas, postfix)
    }

    /// Load a JSON catalog from disk.
    pub fn load(path: &Path, postfix: &str) -> DbResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SweepError::invalid_catalog(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json, postfix)
    }

    /// The service databases reset between test runs. Every schema except
    /// `assign` carries the postfix.
    pub fn builtin(postfix: &str) -> DbResult<Self> {
        let entry = |name: &str, tables: &[&str], postfix: bool| SchemaEntry {
            name: name.to_string(),
            tables: tables.iter().map(|t| t.to_string()).collect(),
            postfix,
        };

        Self::from_entries(
            vec![
                entry(
                    "archisyncsvc",
                    &["cursors", "deliveries", "relations"],
                    true,
                ),
                entry("claimsvc", &["claims", "change_logs"], true),
                entry(
                    "clientsvc",
                    &[
                        "addresses",
                        "change_logs",
                        "client_infos",
                        "clients",
                        "contacts",
                        "passports",
                        "phones",
                        "socials",
                    ],
                    true,
                ),
                entry("loansvc", &["loans", "change_logs"], true),
                entry("prolongationsvc", &["prolongations", "change_logs"], true),
                entry(
                    "cashsvc",
                    &["cash_box_states", "transactions", "change_logs"],
                    true,
                ),
                entry("noncashsvc", &["transactions", "change_logs"], true),
                entry("loantransactionsvc", &["loan_transactions"], true),
                entry("assign", &["assignment", "event_journal"], false),
            ],
            postfix,
        )
    }

    pub fn schemas(&self) -> &[SchemaDefinition] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Total number of delete statements a full sweep issues.
    pub fn table_count(&self) -> usize {
        self.schemas.iter().map(|s| s.tables.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SchemaDefinition> {
        self.schemas.iter()
    }
}

impl<'a> IntoIterator for &'a SchemaCatalog {
    type Item = &'a SchemaDefinition;
    type IntoIter = std::slice::Iter<'a, SchemaDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.schemas.iter()
    }
}

fn is_valid_schema_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2 && parts.iter().all(|p| is_identifier(p))
}
