//! Table storage for minidb
//!
//! A table owns its rows and one hash index per primary-key or unique column.
//! Row positions double as index keys, so every mutation updates the affected
//! indexes in the same call.

use std::collections::HashMap;

use tracing::debug;

use super::index::Index;
use super::value::{Row, Value};
use crate::catalog::Schema;
use crate::config::InvalidFieldPolicy;
use crate::error::{Error, Result};

/// An UPDATE field that was not applied
#[derive(Debug, Clone, PartialEq)]
pub struct IgnoredField {
    /// Column that was assigned
    pub column: String,
    /// Why the value was rejected
    pub reason: String,
}

/// Outcome of [`Table::update`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateOutcome {
    /// Rows that satisfied the predicate
    pub matched: usize,
    /// Assignments skipped because their value failed validation
    pub ignored: Vec<IgnoredField>,
}

/// Project `row` onto `columns`. An empty list or `*` keeps the row as is;
/// columns the row does not carry come out as NULL.
pub fn project(row: &Row, columns: &[String]) -> Row {
    if columns.is_empty() || columns.iter().any(|c| c == "*") {
        return row.clone();
    }
    columns
        .iter()
        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
        .collect()
}

/// An in-memory table
#[derive(Debug, Clone)]
pub struct Table {
    /// Table schema
    schema: Schema,
    /// Rows in insertion order
    rows: Vec<Row>,
    /// Indexes by column name
    indexes: HashMap<String, Index>,
}

impl Table {
    /// Create an empty table with an index for every primary-key/unique column
    pub fn new(schema: Schema) -> Self {
        let indexes = schema
            .columns()
            .iter()
            .filter(|c| c.is_indexed())
            .map(|c| (c.name.clone(), Index::new()))
            .collect();
        Self {
            schema,
            rows: Vec::new(),
            indexes,
        }
    }

    /// Get table name
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Get table schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// All rows, in position order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check whether `column` carries an index
    pub fn is_indexed(&self, column: &str) -> bool {
        self.indexes.contains_key(column)
    }

    /// Insert a row. `values` may omit columns (they take their default, or NULL);
    /// keys that are not columns of the table are ignored.
    ///
    /// Returns the new row's position. On error the table is unchanged.
    pub fn insert(&mut self, mut values: Row) -> Result<usize> {
        let mut row = Row::with_capacity(self.schema.column_count());

        for column in self.schema.columns() {
            let value = values
                .shift_remove(&column.name)
                .or_else(|| column.default.clone())
                .unwrap_or(Value::Null);
            column.validate(&value)?;
            row.insert(column.name.clone(), value);
        }

        if !values.is_empty() {
            debug!(
                table = self.name(),
                ignored = ?values.keys().collect::<Vec<_>>(),
                "insert ignored unknown columns"
            );
        }

        for (column, index) in &self.indexes {
            let value = &row[column.as_str()];
            if index.contains(value) {
                return Err(Error::DuplicateKey {
                    column: column.clone(),
                    value: value.to_string(),
                });
            }
        }

        let position = self.rows.len();
        for (column, index) in self.indexes.iter_mut() {
            index.add(&row[column.as_str()], position);
        }
        self.rows.push(row);

        debug!(table = self.name(), position, "row inserted");
        Ok(position)
    }

    /// Copies of every row projected onto `columns` (empty or `*` = all)
    pub fn select(&self, columns: &[String]) -> Vec<Row> {
        self.rows.iter().map(|r| project(r, columns)).collect()
    }

    /// Apply `assignments` to every row matching `predicate`.
    ///
    /// Unknown columns are skipped. Values are only checked when some row
    /// matches, and a value the column rejects is handled according to
    /// `policy`. Indexed columns are kept in sync and may not end up holding
    /// the same value in two rows.
    pub fn update<P>(
        &mut self,
        assignments: &[(String, Value)],
        predicate: P,
        policy: InvalidFieldPolicy,
    ) -> Result<UpdateOutcome>
    where
        P: Fn(&Row) -> bool,
    {
        let matched: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate(row))
            .map(|(pos, _)| pos)
            .collect();
        if matched.is_empty() {
            return Ok(UpdateOutcome::default());
        }

        let mut effective = Vec::with_capacity(assignments.len());
        let mut ignored = Vec::new();
        for (name, value) in assignments {
            let Some(column) = self.schema.get_column(name) else {
                debug!(table = self.name(), column = %name, "update skipped unknown column");
                continue;
            };
            match column.validate(value) {
                Ok(()) => effective.push((name.as_str(), value)),
                Err(err) => match policy {
                    InvalidFieldPolicy::Reject => return Err(err),
                    InvalidFieldPolicy::Skip | InvalidFieldPolicy::Warn => {
                        ignored.push(IgnoredField {
                            column: name.clone(),
                            reason: err.to_string(),
                        })
                    }
                },
            }
        }

        for &(name, value) in &effective {
            let Some(index) = self.indexes.get(name) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let clash = matched.len() > 1
                || index.find(value).iter().any(|p| *p != matched[0]);
            if clash {
                return Err(Error::DuplicateKey {
                    column: name.to_string(),
                    value: value.to_string(),
                });
            }
        }

        for &position in &matched {
            let row = &mut self.rows[position];
            for &(name, value) in &effective {
                let old = row.get(name).cloned().unwrap_or(Value::Null);
                if old == *value {
                    continue;
                }
                if let Some(index) = self.indexes.get_mut(name) {
                    index.remove(&old, position);
                    index.add(value, position);
                }
                row.insert(name.to_string(), value.clone());
            }
        }

        debug!(table = self.name(), matched = matched.len(), "rows updated");
        Ok(UpdateOutcome {
            matched: matched.len(),
            ignored,
        })
    }

    /// Delete every row matching `predicate` and return how many were removed
    pub fn delete<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(&Row) -> bool,
    {
        let positions: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate(row))
            .map(|(pos, _)| pos)
            .collect();

        // Highest position first so the ones still to be removed do not shift.
        for &position in positions.iter().rev() {
            for (column, index) in self.indexes.iter_mut() {
                if let Some(value) = self.rows[position].get(column) {
                    index.remove(value, position);
                }
            }
            self.rows.remove(position);
        }

        if !positions.is_empty() {
            self.rebuild_indexes();
        }

        debug!(table = self.name(), deleted = positions.len(), "rows deleted");
        positions.len()
    }

    /// Drop every row at position `len` or later. Used to undo a partly applied
    /// multi-row INSERT.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.rows.len() {
            return;
        }
        self.rows.truncate(len);
        self.rebuild_indexes();
    }

    /// Copies of the rows whose indexed `column` holds `value`
    pub fn find_by_index(&self, column: &str, value: &Value) -> Vec<Row> {
        match self.indexes.get(column) {
            Some(index) => index
                .find(value)
                .into_iter()
                .filter_map(|p| self.rows.get(p).cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Re-derive every index from the current rows
    fn rebuild_indexes(&mut self) {
        for (column, index) in self.indexes.iter_mut() {
            index.clear();
            for (position, row) in self.rows.iter().enumerate() {
                if let Some(value) = row.get(column) {
                    index.add(value, position);
                }
            }
        }
        debug!(table = self.name(), rows = self.rows.len(), "indexes rebuilt");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType};

    fn users() -> Table {
        let mut schema = Schema::from_columns(
            "users",
            vec![
                Column::new("id", DataType::Number).primary_key(true),
                Column::new("name", DataType::String).nullable(false),
                Column::new("email", DataType::String).unique(true),
                Column::new("active", DataType::Boolean).default(true),
            ],
        );
        schema.validate().unwrap();
        Table::new(schema)
    }

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn add_user(table: &mut Table, id: i64, name: &str) -> Result<usize> {
        table.insert(row(&[
            ("id", Value::from(id)),
            ("name", Value::from(name)),
            ("email", Value::from(format!("{}@example.com", name))),
        ]))
    }

    /// Index lookups must agree with a full scan for every stored value
    fn assert_index_matches_scan(table: &Table) {
        for column in ["id", "email"] {
            for r in table.rows() {
                let value = &r[column];
                let scanned: Vec<Row> = table
                    .rows()
                    .iter()
                    .filter(|x| &x[column] == value)
                    .cloned()
                    .collect();
                assert_eq!(table.find_by_index(column, value), scanned);
            }
        }
    }

    #[test]
    fn test_insert_fills_schema_order_and_defaults() {
        let mut table = users();
        let pos = table
            .insert(row(&[("name", Value::from("ann")), ("id", Value::from(1))]))
            .unwrap();
        assert_eq!(pos, 0);

        let stored = &table.rows()[0];
        let keys: Vec<&str> = stored.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "name", "email", "active"]);
        assert_eq!(stored["email"], Value::Null);
        assert_eq!(stored["active"], Value::from(true));
    }

    #[test]
    fn test_insert_errors_leave_table_unchanged() {
        let mut table = users();
        add_user(&mut table, 1, "ann").unwrap();

        let dup = add_user(&mut table, 1, "bob");
        assert!(matches!(dup, Err(Error::DuplicateKey { ref column, .. }) if column == "id"));

        let null_name = table.insert(row(&[("id", Value::from(2))]));
        assert_eq!(null_name, Err(Error::NullNotAllowed("name".to_string())));

        let null_pk = table.insert(row(&[("name", Value::from("cy"))]));
        assert_eq!(null_pk, Err(Error::NullNotAllowed("id".to_string())));

        let bad_type = table.insert(row(&[
            ("id", Value::from("2")),
            ("name", Value::from("cy")),
        ]));
        assert!(matches!(bad_type, Err(Error::TypeMismatch { .. })));

        assert_eq!(table.len(), 1);
        assert_eq!(table.find_by_index("id", &Value::from(1)).len(), 1);
        assert!(table.find_by_index("id", &Value::from(2)).is_empty());
    }

    #[test]
    fn test_unique_allows_multiple_nulls() {
        let mut table = users();
        table
            .insert(row(&[("id", Value::from(1)), ("name", Value::from("a"))]))
            .unwrap();
        table
            .insert(row(&[("id", Value::from(2)), ("name", Value::from("b"))]))
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_select_projection() {
        let mut table = users();
        add_user(&mut table, 1, "ann").unwrap();

        let all = table.select(&["*".to_string()]);
        assert_eq!(all[0].len(), 4);

        let some = table.select(&["name".to_string(), "id".to_string(), "nope".to_string()]);
        let keys: Vec<&str> = some[0].keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "id", "nope"]);
        assert_eq!(some[0]["nope"], Value::Null);
    }

    #[test]
    fn test_update_keeps_index_in_sync() {
        let mut table = users();
        add_user(&mut table, 1, "ann").unwrap();
        add_user(&mut table, 2, "bob").unwrap();

        let outcome = table
            .update(
                &[("id".to_string(), Value::from(10))],
                |r| r["name"] == Value::from("bob"),
                InvalidFieldPolicy::Warn,
            )
            .unwrap();
        assert_eq!(outcome.matched, 1);
        assert!(table.find_by_index("id", &Value::from(2)).is_empty());
        assert_eq!(
            table.find_by_index("id", &Value::from(10))[0]["name"],
            Value::from("bob")
        );
        assert_index_matches_scan(&table);
    }

    #[test]
    fn test_update_duplicate_key_rejected() {
        let mut table = users();
        add_user(&mut table, 1, "ann").unwrap();
        add_user(&mut table, 2, "bob").unwrap();

        let err = table
            .update(
                &[("id".to_string(), Value::from(1))],
                |r| r["id"] == Value::from(2),
                InvalidFieldPolicy::Warn,
            )
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));

        let err = table
            .update(
                &[("email".to_string(), Value::from("same"))],
                |_| true,
                InvalidFieldPolicy::Warn,
            )
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));
        assert_eq!(table.rows()[1]["id"], Value::from(2));
        assert_index_matches_scan(&table);
    }

    #[test]
    fn test_update_same_value_is_not_a_clash() {
        let mut table = users();
        add_user(&mut table, 1, "ann").unwrap();
        let outcome = table
            .update(
                &[("id".to_string(), Value::from(1))],
                |_| true,
                InvalidFieldPolicy::Warn,
            )
            .unwrap();
        assert_eq!(outcome.matched, 1);
    }

    #[test]
    fn test_update_invalid_field_policies() {
        let mut table = users();
        add_user(&mut table, 1, "ann").unwrap();
        let assignments = vec![
            ("name".to_string(), Value::from(5)),
            ("active".to_string(), Value::from(false)),
            ("missing".to_string(), Value::from(1)),
        ];

        let outcome = table
            .update(&assignments, |_| true, InvalidFieldPolicy::Warn)
            .unwrap();
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.ignored.len(), 1);
        assert_eq!(outcome.ignored[0].column, "name");
        assert_eq!(table.rows()[0]["name"], Value::from("ann"));
        assert_eq!(table.rows()[0]["active"], Value::from(false));

        let err = table
            .update(&assignments, |_| true, InvalidFieldPolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_update_without_matches_ignores_policy() {
        let mut table = users();
        add_user(&mut table, 1, "ann").unwrap();
        let assignments = vec![("name".to_string(), Value::from(5))];

        for policy in [InvalidFieldPolicy::Reject, InvalidFieldPolicy::Warn] {
            let outcome = table.update(&assignments, |_| false, policy).unwrap();
            assert_eq!(outcome.matched, 0);
            assert!(outcome.ignored.is_empty());
        }
    }

    #[test]
    fn test_update_counts_matches_not_changes() {
        let mut table = users();
        add_user(&mut table, 1, "ann").unwrap();
        add_user(&mut table, 2, "bob").unwrap();
        let outcome = table
            .update(
                &[("active".to_string(), Value::from(true))],
                |_| true,
                InvalidFieldPolicy::Skip,
            )
            .unwrap();
        assert_eq!(outcome.matched, 2);
    }

    #[test]
    fn test_delete_rebuilds_positions() {
        let mut table = users();
        for (id, name) in [(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")] {
            add_user(&mut table, id, name).unwrap();
        }

        let deleted = table.delete(|r| {
            r["id"] == Value::from(2) || r["id"] == Value::from(4)
        });
        assert_eq!(deleted, 2);
        assert_eq!(table.len(), 3);

        let found = table.find_by_index("id", &Value::from(5));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["name"], Value::from("e"));
        assert_index_matches_scan(&table);

        assert_eq!(table.delete(|r| r["id"] == Value::from(2)), 0);
    }

    #[test]
    fn test_truncate_drops_tail_and_index_entries() {
        let mut table = users();
        for (id, name) in [(1, "a"), (2, "b"), (3, "c")] {
            add_user(&mut table, id, name).unwrap();
        }
        table.truncate(1);
        assert_eq!(table.len(), 1);
        assert!(table.find_by_index("id", &Value::from(3)).is_empty());
        add_user(&mut table, 3, "c").unwrap();
        assert_index_matches_scan(&table);

        table.truncate(10);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_find_by_unindexed_column() {
        let mut table = users();
        add_user(&mut table, 1, "ann").unwrap();
        assert!(table.find_by_index("name", &Value::from("ann")).is_empty());
        assert!(!table.is_indexed("name"));
        assert!(table.is_indexed("email"));
    }
}
