//! Database for minidb
//!
//! Owns every table, keyed by name, in creation order.

use indexmap::IndexMap;
use tracing::info;

use super::schema::Schema;
use crate::error::{Error, Result};
use crate::storage::Table;

/// A set of named tables
#[derive(Debug, Default)]
pub struct Database {
    tables: IndexMap<String, Table>,
}

impl Database {
    /// Create a new empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table
    pub fn create_table(&mut self, mut schema: Schema) -> Result<&Table> {
        let name = schema.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(Error::TableAlreadyExists(name));
        }
        schema.validate()?;

        info!(table = %name, columns = schema.column_count(), "table created");
        let table = self.tables.entry(name).or_insert(Table::new(schema));
        Ok(table)
    }

    /// Drop a table and its indexes
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        if self.tables.shift_remove(name).is_none() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        info!(table = %name, "table dropped");
        Ok(())
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Get a table by name for mutation
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check if a table exists
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// List all table names in creation order
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.keys().map(|k| k.as_str()).collect()
    }
}
