//! Output formatting for generation answers.

use serde_json::Value as JsonValue;

use crate::database::QueryResult;
use crate::protocol::rest::dto::{GenerateSqlResponse, QueryOutcome};

/// Format JSON value for table display
fn format_json_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    }
}

/// Aligned text table, or `None` when there are no columns or no rows.
pub fn render_table(result: &QueryResult) -> Option<String> {
    if result.columns.is_empty() || result.data.is_empty() {
        return None;
    }

    let cells: Vec<Vec<String>> = result
        .data
        .iter()
        .map(|row| row.iter().map(format_json_value).collect())
        .collect();

    let mut col_widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, value) in row.iter().enumerate() {
            if let Some(width) = col_widths.get_mut(i) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    let mut output = String::new();

    let header: Vec<String> = result
        .columns
        .iter()
        .zip(&col_widths)
        .map(|(col, &width)| format!("{col:width$}"))
        .collect();
    output.push_str(header.join(" | ").trim_end());
    output.push('\n');

    let total_width: usize = col_widths.iter().sum::<usize>() + (col_widths.len() - 1) * 3;
    output.push_str(&"-".repeat(total_width));
    output.push('\n');

    for row in &cells {
        let parts: Vec<String> = col_widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let value = row.get(i).map_or("", String::as_str);
                format!("{value:width$}")
            })
            .collect();
        output.push_str(parts.join(" | ").trim_end());
        output.push('\n');
    }

    match result.row_count {
        1 => output.push_str("(1 row)"),
        n => output.push_str(&format!("({n} rows)")),
    }

    Some(output)
}

/// Model text, then the rows or the inline execution error.
pub fn render_answer(response: &GenerateSqlResponse) -> String {
    let mut output = response.sql_query.trim_end().to_string();

    match &response.execute_query {
        Some(QueryOutcome::Rows(result)) => {
            if let Some(table) = render_table(result) {
                output.push_str("\n\n");
                output.push_str(&table);
            }
        }
        Some(QueryOutcome::Error { error }) => {
            output.push_str(&format!("\n\nError: {error}"));
        }
        None => {}
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(execute_query: Option<QueryOutcome>) -> GenerateSqlResponse {
        GenerateSqlResponse {
            status: "success".to_string(),
            sql_query: "```sql\nSELECT id, name FROM users\n```".to_string(),
            execute_query,
        }
    }

    #[test]
    fn test_format_json_value() {
        assert_eq!(format_json_value(&JsonValue::Null), "NULL");
        assert_eq!(format_json_value(&json!(true)), "true");
        assert_eq!(format_json_value(&json!("test")), "test");
        assert_eq!(format_json_value(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_render_table_alignment() {
        let result = QueryResult::new(
            vec!["id".to_string(), "name".to_string()],
            vec![vec![json!(1), json!("alice")], vec![json!(22), json!(null)]],
        );
        let table = render_table(&result).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "id | name");
        assert_eq!(lines[1], "----------");
        assert_eq!(lines[2], "1  | alice");
        assert_eq!(lines[3], "22 | NULL");
        assert_eq!(lines[4], "(2 rows)");
    }

    #[test]
    fn test_render_table_needs_columns_and_rows() {
        assert!(render_table(&QueryResult::new(vec!["id".to_string()], vec![])).is_none());
        assert!(render_table(&QueryResult::new(vec![], vec![vec![]])).is_none());
    }

    #[test]
    fn test_render_answer_with_rows() {
        let text = render_answer(&answer(Some(QueryOutcome::Rows(QueryResult::new(
            vec!["id".to_string()],
            vec![vec![json!(7)]],
        )))));
        assert!(text.starts_with("```sql\nSELECT id, name FROM users\n```"));
        assert!(text.contains("\n\nid\n"));
        assert!(text.ends_with("(1 row)"));
    }

    #[test]
    fn test_render_answer_with_error() {
        let text = render_answer(&answer(Some(QueryOutcome::Error {
            error: "Query not supported.".to_string(),
        })));
        assert!(text.ends_with("\n\nError: Query not supported."));
    }

    #[test]
    fn test_render_answer_without_execution() {
        let text = render_answer(&answer(None));
        assert_eq!(text, "```sql\nSELECT id, name FROM users\n```");
    }
}
