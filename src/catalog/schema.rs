//! Schema definitions for minidb
//!
//! This module defines table schemas and column metadata.

use super::types::DataType;
use crate::error::{Error, Result};
use crate::storage::Value;
use std::collections::HashMap;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Is this column nullable?
    pub nullable: bool,
    /// Is this the primary key?
    pub primary_key: bool,
    /// Is this column unique?
    pub unique: bool,
    /// Value used when an INSERT omits the column
    pub default: Option<Value>,
}

impl Column {
    /// Create a new nullable column with no constraints
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            unique: false,
            default: None,
        }
    }

    /// Set nullable flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set primary key flag
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.primary_key = pk;
        if pk {
            self.nullable = false;
        }
        self
    }

    /// Set unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set default value
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Primary-key and unique columns carry an index
    pub fn is_indexed(&self) -> bool {
        self.primary_key || self.unique
    }

    /// Check that `value` may be stored in this column
    pub fn validate(&self, value: &Value) -> Result<()> {
        match value.data_type() {
            None if self.nullable && !self.primary_key => Ok(()),
            None => Err(Error::NullNotAllowed(self.name.clone())),
            Some(dt) if dt == self.data_type => Ok(()),
            Some(_) => Err(Error::TypeMismatch {
                column: self.name.clone(),
                expected: self.data_type.to_string(),
                found: value.type_name().to_string(),
            }),
        }
    }

    /// Key marker reported by DESCRIBE
    pub fn key_marker(&self) -> &'static str {
        if self.primary_key {
            "PRI"
        } else if self.unique {
            "UNI"
        } else {
            ""
        }
    }
}

/// Table schema - defines the structure of a table
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Table name
    name: String,
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to index mapping
    name_to_index: HashMap<String, usize>,
    /// Name of the primary-key column, resolved at table creation
    primary_key: Option<String>,
}

impl Schema {
    /// Create a new schema with no columns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            name_to_index: HashMap::new(),
            primary_key: None,
        }
    }

    /// Create a schema from a list of columns
    pub fn from_columns(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut schema = Self::new(name);
        for col in columns {
            schema.add_column(col);
        }
        schema
    }

    /// Add a column to the schema. A repeated name keeps the first lookup entry;
    /// [`Schema::validate`] reports it.
    pub fn add_column(&mut self, column: Column) {
        self.name_to_index
            .entry(column.name.clone())
            .or_insert(self.columns.len());
        self.columns.push(column);
    }

    /// Check the schema and record its primary-key column
    pub fn validate(&mut self) -> Result<()> {
        if self.name_to_index.len() != self.columns.len() {
            let mut seen = HashMap::new();
            for col in &self.columns {
                if seen.insert(col.name.as_str(), ()).is_some() {
                    return Err(Error::DuplicateColumn(col.name.clone(), self.name.clone()));
                }
            }
        }

        let mut pks = self.columns.iter().filter(|c| c.primary_key);
        let pk = pks.next().map(|c| c.name.clone());
        if pks.next().is_some() {
            return Err(Error::MultiplePrimaryKeys(self.name.clone()));
        }

        for col in &self.columns {
            if let Some(default) = &col.default {
                col.validate(default)?;
            }
        }

        self.primary_key = pk;
        Ok(())
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Primary-key column name, once the schema has been validated
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
