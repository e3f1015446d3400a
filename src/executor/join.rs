//! Nested-loop join
//!
//! Every left row is compared with every right row on a single equality.
//! Output keys are qualified as `<table>.<column>`.

use crate::sql::ast::{JoinClause, JoinType};
use crate::storage::{Row, Value};

/// Copy `row` into `out` with every key prefixed by `table.`
fn qualify_into(out: &mut Row, table: &str, row: &Row) {
    for (column, value) in row {
        out.insert(format!("{}.{}", table, column), value.clone());
    }
}

/// Join `left_rows` (from `left_table`) with `right_rows` (from `join.table_name`).
///
/// A match requires exact equality of the two join columns. A LEFT join keeps
/// an unmatched left row with only its own qualified columns.
pub fn nested_loop_join(
    left_table: &str,
    left_rows: &[Row],
    right_rows: &[Row],
    join: &JoinClause,
) -> Vec<Row> {
    let mut result = Vec::new();

    for left in left_rows {
        let left_value = left.get(&join.left_column).unwrap_or(&Value::Null);
        let mut matched = false;

        for right in right_rows {
            let right_value = right.get(&join.right_column).unwrap_or(&Value::Null);
            if left_value != right_value {
                continue;
            }
            matched = true;

            let mut combined = Row::with_capacity(left.len() + right.len());
            qualify_into(&mut combined, left_table, left);
            qualify_into(&mut combined, &join.table_name, right);
            result.push(combined);
        }

        if !matched && join.join_type == JoinType::Left {
            let mut only_left = Row::with_capacity(left.len());
            qualify_into(&mut only_left, left_table, left);
            result.push(only_left);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn clause(join_type: JoinType) -> JoinClause {
        JoinClause {
            join_type,
            table_name: "authors".to_string(),
            left_column: "author_id".to_string(),
            right_column: "id".to_string(),
        }
    }

    fn books() -> Vec<Row> {
        vec![
            row(&[("id", Value::from(1)), ("author_id", Value::from(1))]),
            row(&[("id", Value::from(2)), ("author_id", Value::from(7))]),
            row(&[("id", Value::from(3)), ("author_id", Value::from(1))]),
        ]
    }

    fn authors() -> Vec<Row> {
        vec![
            row(&[("id", Value::from(1)), ("name", Value::from("ann"))]),
            row(&[("id", Value::from("7")), ("name", Value::from("str"))]),
        ]
    }

    #[test]
    fn test_inner_join() {
        let rows = nested_loop_join("books", &books(), &authors(), &clause(JoinType::Inner));
        assert_eq!(rows.len(), 2);

        let keys: Vec<&str> = rows[0].keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["books.id", "books.author_id", "authors.id", "authors.name"]
        );
        assert_eq!(rows[1]["books.id"], Value::from(3));
        assert_eq!(rows[1]["authors.name"], Value::from("ann"));
    }

    #[test]
    fn test_left_join_keeps_unmatched_without_padding() {
        let rows = nested_loop_join("books", &books(), &authors(), &clause(JoinType::Left));
        assert_eq!(rows.len(), 3);

        // number 7 does not equal string "7"
        let unmatched = &rows[1];
        assert_eq!(unmatched.len(), 2);
        assert!(unmatched.keys().all(|k| k.starts_with("books.")));
    }

    #[test]
    fn test_inner_never_exceeds_left() {
        let inner = nested_loop_join("books", &books(), &authors(), &clause(JoinType::Inner));
        let left = nested_loop_join("books", &books(), &authors(), &clause(JoinType::Left));
        assert!(inner.len() <= left.len());
    }

    #[test]
    fn test_empty_right_side() {
        let rows = nested_loop_join("books", &books(), &[], &clause(JoinType::Inner));
        assert!(rows.is_empty());

        let rows = nested_loop_join("books", &books(), &[], &clause(JoinType::Left));
        assert_eq!(rows.len(), 3);
    }
}
