//! WHERE clause evaluation
//!
//! A WHERE clause is a conjunction of `column OP literal` conditions.

use crate::sql::ast::{ComparisonOp, Condition};
use crate::storage::{Row, Value};

/// Find `column` in `row`, where the row belongs to (or was joined from) `table`.
///
/// Tries the exact key first, then `table.column` written against a plain
/// row, then a plain name against a row whose keys are qualified by a join.
pub fn lookup<'a>(row: &'a Row, column: &str, table: &str) -> Option<&'a Value> {
    if let Some(value) = row.get(column) {
        return Some(value);
    }
    match column.split_once('.') {
        Some((qualifier, bare)) if qualifier == table => row.get(bare),
        Some(_) => None,
        None => row.get(&format!("{}.{}", table, column)),
    }
}

/// Evaluate one condition. Missing columns read as NULL.
///
/// `=` and `!=` are exact value+type comparisons. Ordering operators only hold
/// between two numbers.
pub fn evaluate(condition: &Condition, row: &Row, table: &str) -> bool {
    let left = lookup(row, &condition.column, table).unwrap_or(&Value::Null);
    let right = &condition.value;

    match condition.op {
        ComparisonOp::Eq => left == right,
        ComparisonOp::Neq => left != right,
        ComparisonOp::Lt => left.compare_numeric(right).is_some_and(|o| o.is_lt()),
        ComparisonOp::Gt => left.compare_numeric(right).is_some_and(|o| o.is_gt()),
        ComparisonOp::Lte => left.compare_numeric(right).is_some_and(|o| o.is_le()),
        ComparisonOp::Gte => left.compare_numeric(right).is_some_and(|o| o.is_ge()),
    }
}

/// All conditions hold; stops at the first one that does not. No conditions = true.
pub fn matches_all(conditions: &[Condition], row: &Row, table: &str) -> bool {
    conditions.iter().all(|c| evaluate(c, row, table))
}

/// Row predicate for a WHERE clause over `table`
pub fn build<'a>(conditions: &'a [Condition], table: &'a str) -> impl Fn(&Row) -> bool + 'a {
    move |row| matches_all(conditions, row, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::from(5));
        row.insert("name".to_string(), Value::from("ann"));
        row.insert("active".to_string(), Value::from(true));
        row.insert("note".to_string(), Value::Null);
        row
    }

    fn cond(column: &str, op: ComparisonOp, value: impl Into<Value>) -> Condition {
        Condition {
            column: column.to_string(),
            op,
            value: value.into(),
        }
    }

    #[test]
    fn test_equality_is_exact() {
        let row = row();
        assert!(evaluate(&cond("id", ComparisonOp::Eq, 5), &row, "t"));
        assert!(!evaluate(&cond("id", ComparisonOp::Eq, "5"), &row, "t"));
        assert!(evaluate(&cond("id", ComparisonOp::Neq, "5"), &row, "t"));
        assert!(evaluate(&cond("active", ComparisonOp::Eq, true), &row, "t"));
        assert!(evaluate(&cond("note", ComparisonOp::Eq, Value::Null), &row, "t"));
    }

    #[test]
    fn test_numeric_ordering() {
        let row = row();
        assert!(evaluate(&cond("id", ComparisonOp::Gt, 4), &row, "t"));
        assert!(evaluate(&cond("id", ComparisonOp::Gte, 5), &row, "t"));
        assert!(evaluate(&cond("id", ComparisonOp::Lte, 5), &row, "t"));
        assert!(!evaluate(&cond("id", ComparisonOp::Lt, 5), &row, "t"));
        // non-numbers never order
        assert!(!evaluate(&cond("name", ComparisonOp::Gt, "a"), &row, "t"));
        assert!(!evaluate(&cond("name", ComparisonOp::Lt, "z"), &row, "t"));
    }

    #[test]
    fn test_missing_column_reads_null() {
        let row = row();
        assert!(evaluate(&cond("nope", ComparisonOp::Eq, Value::Null), &row, "t"));
        assert!(!evaluate(&cond("nope", ComparisonOp::Gt, 0), &row, "t"));
    }

    #[test]
    fn test_qualified_lookup() {
        let row = row();
        assert_eq!(lookup(&row, "t.id", "t"), Some(&Value::from(5)));
        assert_eq!(lookup(&row, "other.id", "t"), None);

        let mut joined = Row::new();
        joined.insert("t.id".to_string(), Value::from(1));
        assert_eq!(lookup(&joined, "id", "t"), Some(&Value::from(1)));
        assert_eq!(lookup(&joined, "t.id", "t"), Some(&Value::from(1)));
    }

    #[test]
    fn test_conjunction() {
        let row = row();
        let conditions = vec![
            cond("id", ComparisonOp::Gt, 1),
            cond("name", ComparisonOp::Eq, "ann"),
        ];
        assert!(matches_all(&conditions, &row, "t"));
        assert!(matches_all(&[], &row, "t"));

        let predicate = build(&conditions[..1], "t");
        assert!(predicate(&row));

        let failing = vec![cond("id", ComparisonOp::Gt, 1), cond("name", ComparisonOp::Eq, "bob")];
        assert!(!matches_all(&failing, &row, "t"));
    }
}
