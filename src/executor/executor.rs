//! Query Executor for minidb
//!
//! This module executes parsed statements against a [`Database`] and returns results.

use serde::Serialize;
use tracing::{debug, warn};

use super::join::nested_loop_join;
use super::predicate;
use crate::catalog::{Column, Database, Schema};
use crate::config::{EngineConfig, InvalidFieldPolicy};
use crate::error::{Error, ErrorKind, Result};
use crate::sql::ast::*;
use crate::storage::{Row, Value};

/// Query result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Did the statement succeed?
    pub success: bool,
    /// Result rows (SELECT, SHOW TABLES, DESCRIBE)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    /// Rows returned or affected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    /// Message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error text of a failed statement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Classification of `error`
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl QueryResult {
    /// Create a result carrying rows
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            success: true,
            row_count: Some(rows.len()),
            rows: Some(rows),
            message: None,
            error: None,
            error_kind: None,
        }
    }

    /// Create a result with a message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            rows: None,
            row_count: None,
            message: Some(message.into()),
            error: None,
            error_kind: None,
        }
    }

    /// Create a result with affected rows count
    pub fn with_affected_rows(count: usize, message: impl Into<String>) -> Self {
        Self {
            row_count: Some(count),
            ..Self::with_message(message)
        }
    }

    /// Create a failed result from an error
    pub fn failure(err: &Error) -> Self {
        Self {
            success: false,
            rows: None,
            row_count: None,
            message: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }
    }
}

/// Execution Engine
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    config: EngineConfig,
}

impl QueryExecutor {
    /// Create a new executor
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get the executor configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute one statement
    pub fn execute(&self, db: &mut Database, statement: Statement) -> Result<QueryResult> {
        debug!(statement = statement.kind(), "executing statement");

        match statement {
            Statement::CreateTable(stmt) => self.execute_create_table(db, stmt),
            Statement::DropTable(stmt) => self.execute_drop_table(db, stmt),
            Statement::Insert(stmt) => self.execute_insert(db, stmt),
            Statement::Select(stmt) => self.execute_select(db, &stmt),
            Statement::Update(stmt) => self.execute_update(db, stmt),
            Statement::Delete(stmt) => self.execute_delete(db, stmt),
            Statement::ShowTables => self.execute_show_tables(db),
            Statement::Describe(table_name) => self.execute_describe(db, &table_name),
        }
    }

    fn execute_create_table(
        &self,
        db: &mut Database,
        stmt: CreateTableStatement,
    ) -> Result<QueryResult> {
        if stmt.if_not_exists && db.has_table(&stmt.table_name) {
            return Ok(QueryResult::with_message(format!(
                "Table '{}' already exists, skipped",
                stmt.table_name
            )));
        }

        let columns = stmt
            .columns
            .into_iter()
            .map(|def| {
                let column = Column::new(def.name, def.data_type)
                    .nullable(!def.not_null)
                    .unique(def.unique)
                    .primary_key(def.primary_key);
                match def.default {
                    Some(value) => column.default(value),
                    None => column,
                }
            })
            .collect();

        db.create_table(Schema::from_columns(stmt.table_name.clone(), columns))?;

        Ok(QueryResult::with_message(format!(
            "Table '{}' created",
            stmt.table_name
        )))
    }

    fn execute_drop_table(
        &self,
        db: &mut Database,
        stmt: DropTableStatement,
    ) -> Result<QueryResult> {
        if stmt.if_exists && !db.has_table(&stmt.table_name) {
            return Ok(QueryResult::with_message(format!(
                "Table '{}' does not exist, skipped",
                stmt.table_name
            )));
        }

        db.drop_table(&stmt.table_name)?;

        Ok(QueryResult::with_message(format!(
            "Table '{}' dropped",
            stmt.table_name
        )))
    }

    fn execute_insert(&self, db: &mut Database, stmt: InsertStatement) -> Result<QueryResult> {
        let table = db.get_table_mut(&stmt.table_name)?;

        let columns: Vec<String> = match stmt.columns {
            Some(columns) => columns,
            None => table
                .schema()
                .column_names()
                .into_iter()
                .map(String::from)
                .collect(),
        };

        // All rows or none: undo this statement's rows on the first failure
        let start = table.len();
        let mut inserted = 0;
        for values in stmt.values {
            let row: Row = columns.iter().cloned().zip(values).collect();
            if let Err(err) = table.insert(row) {
                table.truncate(start);
                return Err(err);
            }
            inserted += 1;
        }

        let message = if inserted == 1 {
            "1 row inserted".to_string()
        } else {
            format!("{} rows inserted", inserted)
        };
        Ok(QueryResult::with_affected_rows(inserted, message))
    }

    fn execute_select(&self, db: &Database, stmt: &SelectStatement) -> Result<QueryResult> {
        let table = db.get_table(&stmt.table_name)?;

        let matches = predicate::build(&stmt.where_clause, &stmt.table_name);
        let mut rows = table.select(&[]);
        rows.retain(|row| matches(row));

        let mut tables = vec![stmt.table_name.as_str()];
        if let Some(join) = &stmt.join {
            let right = db.get_table(&join.table_name)?;
            if !table.schema().has_column(&join.left_column) {
                return Err(Error::ColumnNotFound(
                    join.left_column.clone(),
                    stmt.table_name.clone(),
                ));
            }
            if !right.schema().has_column(&join.right_column) {
                return Err(Error::ColumnNotFound(
                    join.right_column.clone(),
                    join.table_name.clone(),
                ));
            }
            rows = nested_loop_join(&stmt.table_name, &rows, right.rows(), join);
            tables.push(join.table_name.as_str());
        }

        let rows = rows
            .iter()
            .map(|row| project(row, &stmt.columns, &tables))
            .collect();

        Ok(QueryResult::with_rows(rows))
    }

    fn execute_update(&self, db: &mut Database, stmt: UpdateStatement) -> Result<QueryResult> {
        let policy = self.config.invalid_field_policy;
        let table = db.get_table_mut(&stmt.table_name)?;

        let matches = predicate::build(&stmt.where_clause, &stmt.table_name);
        let outcome = table.update(&stmt.assignments, matches, policy)?;

        let mut message = format!("{} row(s) updated", outcome.matched);
        for field in &outcome.ignored {
            match policy {
                InvalidFieldPolicy::Warn => {
                    warn!(
                        table = %stmt.table_name,
                        column = %field.column,
                        reason = %field.reason,
                        "update ignored invalid field"
                    );
                    message.push_str(&format!(
                        "; WARN: ignored field '{}' ({})",
                        field.column, field.reason
                    ));
                }
                _ => debug!(column = %field.column, "update skipped invalid field"),
            }
        }

        Ok(QueryResult::with_affected_rows(outcome.matched, message))
    }

    fn execute_delete(&self, db: &mut Database, stmt: DeleteStatement) -> Result<QueryResult> {
        let table = db.get_table_mut(&stmt.table_name)?;

        let matches = predicate::build(&stmt.where_clause, &stmt.table_name);
        let deleted = table.delete(matches);

        Ok(QueryResult::with_affected_rows(
            deleted,
            format!("{} row(s) deleted", deleted),
        ))
    }

    fn execute_show_tables(&self, db: &Database) -> Result<QueryResult> {
        let rows = db
            .list_tables()
            .into_iter()
            .map(|name| {
                let mut row = Row::new();
                row.insert("table_name".to_string(), Value::from(name));
                row
            })
            .collect();
        Ok(QueryResult::with_rows(rows))
    }

    fn execute_describe(&self, db: &Database, table_name: &str) -> Result<QueryResult> {
        let table = db.get_table(table_name)?;

        let rows = table
            .schema()
            .columns()
            .iter()
            .map(|column| {
                let mut row = Row::with_capacity(5);
                row.insert("Field".to_string(), Value::from(column.name.as_str()));
                row.insert("Type".to_string(), Value::from(column.data_type.name()));
                let null = if column.nullable { "YES" } else { "NO" };
                row.insert("Null".to_string(), Value::from(null));
                row.insert("Key".to_string(), Value::from(column.key_marker()));
                row.insert(
                    "Default".to_string(),
                    column.default.clone().unwrap_or(Value::Null),
                );
                row
            })
            .collect();

        Ok(QueryResult::with_rows(rows))
    }
}

/// Project a (possibly joined) row onto the selected columns.
/// Names are resolved against each of `tables` in turn; unresolved ones are NULL.
fn project(row: &Row, columns: &[String], tables: &[&str]) -> Row {
    if columns.iter().any(|c| c == "*") {
        return row.clone();
    }
    columns
        .iter()
        .map(|column| {
            let value = tables
                .iter()
                .find_map(|table| predicate::lookup(row, column, table))
                .cloned()
                .unwrap_or(Value::Null);
            (column.clone(), value)
        })
        .collect()
}
