//! Result rendering for the console

use crate::config::OutputMode;
use crate::executor::QueryResult;
use crate::storage::{Row, Value};

/// Render `result` in the given output mode
pub fn render(result: &QueryResult, mode: OutputMode) -> String {
    match mode {
        OutputMode::Table => render_table(result),
        OutputMode::Json => render_json(result),
    }
}

/// Render a result as text: an ASCII table for rows, the message otherwise,
/// `ERROR: ...` for failures.
pub fn render_table(result: &QueryResult) -> String {
    if !result.success {
        return format!(
            "ERROR: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    match &result.rows {
        Some(rows) if rows.is_empty() => "Empty result set".to_string(),
        Some(rows) => format_rows(rows),
        None => result.message.clone().unwrap_or_default(),
    }
}

/// Pretty-printed JSON of the whole result object
pub fn render_json(result: &QueryResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|err| format!("ERROR: {}", err))
}

/// Union of the row keys, in order of first appearance
fn collect_columns(rows: &[Row]) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }
    columns
}

fn format_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let inner = values
        .zip(widths)
        .map(|(v, w)| format!(" {:<width$} ", v, width = *w))
        .collect::<Vec<_>>()
        .join("|");
    format!("|{}|", inner)
}

fn format_rows(rows: &[Row]) -> String {
    let columns = collect_columns(rows);

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(*c).unwrap_or(&Value::Null).to_string())
                .collect()
        })
        .collect();

    // Calculate column widths
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+", separator);

    let mut output = Vec::with_capacity(rows.len() + 5);
    output.push(separator.clone());
    output.push(format_line(columns.iter().copied(), &widths));
    output.push(separator.clone());
    for row in &cells {
        output.push(format_line(row.iter().map(String::as_str), &widths));
    }
    output.push(separator);
    output.push(format!("{} row(s)", rows.len()));

    output.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_table_layout() {
        let result = QueryResult::with_rows(vec![
            row(&[("id", Value::from(1)), ("name", Value::from("ann"))]),
            row(&[("id", Value::from(2.5)), ("name", Value::from(true))]),
        ]);
        let expected = "\
+-----+------+
| id  | name |
+-----+------+
| 1   | ann  |
| 2.5 | true |
+-----+------+
2 row(s)";
        assert_eq!(render_table(&result), expected);
    }

    #[test]
    fn test_ragged_rows_render_null() {
        let result = QueryResult::with_rows(vec![
            row(&[("a.x", Value::from(1))]),
            row(&[("a.x", Value::from(2)), ("b.y", Value::from("z"))]),
        ]);
        let text = render_table(&result);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "| a.x | b.y  |");
        assert_eq!(lines[3], "| 1   | NULL |");
        assert_eq!(lines[4], "| 2   | z    |");
    }

    #[test]
    fn test_message_empty_and_error() {
        assert_eq!(
            render_table(&QueryResult::with_message("Table 't' created")),
            "Table 't' created"
        );
        assert_eq!(
            render_table(&QueryResult::with_rows(Vec::new())),
            "Empty result set"
        );
        let failure = QueryResult::failure(&Error::TableNotFound("t".to_string()));
        assert_eq!(
            render_table(&failure),
            "ERROR: Schema error: table 't' does not exist"
        );
    }

    #[test]
    fn test_json_mode() {
        let result = QueryResult::with_rows(vec![row(&[
            ("id", Value::from(1)),
            ("name", Value::Null),
        ])]);
        let text = render(&result, OutputMode::Json);
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["rowCount"], 1);
        assert_eq!(parsed["rows"][0]["id"], 1);
        assert!(text.contains("\"id\": 1,"));
        assert!(parsed["rows"][0]["name"].is_null());
    }
}
