use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TopologyError};

/// Parsed description of a database schema snapshot.
///
/// The snapshot may be partial: foreign keys referencing tables absent
/// from it are dropped during assembly rather than reported as errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

/// One table of the schema snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
    #[serde(default)]
    pub indexes: Vec<IndexSchema>,
}

/// One column of a table, optionally carrying a foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyRef>,
}

/// Target of a foreign key column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

/// One index declared on a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSchema {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

impl SchemaDescription {
    /// Returns an empty schema, for runs that analyze code only.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a schema description from its JSON document form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TopologyError::Schema {
            message: format!("invalid schema document: {e}"),
        })
    }

    /// Loads a schema description from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| TopologyError::Schema {
            message: format!("failed to read schema file '{}': {e}", path.display()),
        })?;
        Self::from_json(&contents)
    }
}
